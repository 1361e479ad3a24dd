use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::Result;
use log::{debug, error};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

pub trait AppLoop: Sized {
    fn init(window: Arc<Window>) -> Result<Self>;

    fn resize(&mut self, _width: u32, _height: u32) {}

    fn draw(&mut self);
}

pub struct App {
    title: String,
    frame_rate: f32,
}

impl App {
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_framerate(mut self, frame_rate: f32) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    pub fn run<T: AppLoop + 'static>(self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut runner = Runner::<T> {
            frame_time: Duration::from_secs_f32(1.0 / self.frame_rate.max(1.0)),
            app: self,
            window: None,
            app_loop: None,
            last_frame: Instant::now(),
            error: None,
        };
        event_loop.run_app(&mut runner)?;

        match runner.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

struct Runner<T> {
    app: App,
    frame_time: Duration,
    window: Option<Arc<Window>>,
    app_loop: Option<T>,
    last_frame: Instant,
    error: Option<anyhow::Error>,
}

impl<T: AppLoop> Runner<T> {
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        error!("{:#}", err);
        self.error = Some(err);
        event_loop.exit();
    }
}

impl<T: AppLoop> ApplicationHandler for Runner<T> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.app_loop.is_some() {
            return;
        }

        let attributes = Window::default_attributes().with_title(self.app.title.clone());
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => return self.fail(event_loop, err.into()),
        };

        match T::init(window.clone()) {
            Ok(app_loop) => {
                self.app_loop = Some(app_loop);
                self.window = Some(window);
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(app_loop) = self.app_loop.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(new_size) => {
                debug!("resized {:?}", new_size);
                app_loop.resize(new_size.width, new_size.height);
            }
            WindowEvent::RedrawRequested => {
                self.last_frame = Instant::now();
                app_loop.draw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            if self.last_frame.elapsed() >= self.frame_time {
                window.request_redraw();
            }
        }
    }
}

pub fn make_window() -> App {
    env_logger::init();

    App {
        title: "gggg_label".into(),
        frame_rate: 60.0,
    }
}
