use std::sync::Arc;

use log::{error, info};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    assets::{AssetLoader, FileSystemSource},
    config::SceneConfig,
    error::{RenderError, Result},
    gfx::{
        camera::{camera_controller::scroll_amount, MovementKey},
        rendering::WgpuContext,
        scene::Scene,
    },
};

pub struct StellarApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    window: Option<Arc<Window>>,
    context: Option<WgpuContext>,
    scene: Scene,
    look_held: bool,
    fatal: Option<RenderError>,
}

impl StellarApp {
    /// Creates the event loop and a scene reading assets from `config.assets_root`
    pub fn new(config: SceneConfig) -> Result<Self> {
        let event_loop =
            EventLoop::new().map_err(|e| RenderError::ContextCreation(e.to_string()))?;
        let loader = AssetLoader::new(FileSystemSource::new(&config.assets_root));
        let scene = Scene::new(config, loader);

        Ok(Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                window: None,
                context: None,
                scene,
                look_held: false,
                fatal: None,
            },
        })
    }

    /// Runs until the window closes; returns the error that ended it, if any
    pub fn run(mut self) -> Result<()> {
        let Some(event_loop) = self.event_loop.take() else {
            return Err(RenderError::ContextCreation("event loop already consumed".into()));
        };
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop
            .run_app(&mut self.app_state)
            .map_err(|e| RenderError::ContextCreation(e.to_string()))?;

        match self.app_state.fatal.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn fail(&mut self, event_loop: &ActiveEventLoop, e: RenderError) {
        error!("{e}");
        self.shutdown();
        self.fatal = Some(e);
        event_loop.exit();
    }

    fn shutdown(&mut self) {
        if let Some(context) = self.context.as_mut() {
            if !self.scene.is_stopped() {
                self.scene.stop(context);
            }
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window = event_loop
            .create_window(
                WindowAttributes::default()
                    .with_title("Stellar")
                    .with_inner_size(winit::dpi::LogicalSize::new(1200, 800)),
            )
            .map_err(|e| RenderError::ContextCreation(e.to_string()))?;
        let window = Arc::new(window);
        self.window = Some(window.clone());

        let (width, height) = window.inner_size().into();
        let mut context = pollster::block_on(WgpuContext::new(window.clone(), width, height))?;

        self.scene.resize(width, height);
        let started = self.scene.start(&mut context);
        self.context = Some(context);
        started?;

        window.request_redraw();
        Ok(())
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.start(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if self.context.is_none() {
            return;
        }

        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key,
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                if physical_key == PhysicalKey::Code(KeyCode::Escape) {
                    self.shutdown();
                    event_loop.exit();
                } else if let Some(key) = MovementKey::from_physical_key(physical_key) {
                    self.scene.on_key_down(key);
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.look_held = state.is_pressed();
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.scene.on_mouse_wheel(scroll_amount(&delta));
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if let Some(context) = self.context.as_mut() {
                    context.resize(width, height);
                }
                self.scene.resize(width, height);
            }
            WindowEvent::CloseRequested => {
                info!("Close requested");
                self.shutdown();
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                if self.scene.is_stopped() {
                    return;
                }
                let Some(context) = self.context.as_mut() else {
                    return;
                };
                context.begin_frame();
                self.scene.draw_frame(context);
                if let Err(e) = context.end_frame() {
                    self.fail(event_loop, e);
                    return;
                }
                if let Some(window) = self.window.as_ref() {
                    window.request_redraw();
                }
            }
            _ => (),
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            self.scene.on_mouse_move(dx as f32, dy as f32, self.look_held);
        }
    }
}
