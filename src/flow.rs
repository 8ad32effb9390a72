//! Application event loop of the viewer.
//!
//! One window (a canvas on the web) shows one model. The flow is:
//!
//! 1. `resumed` creates the window and the GPU [`Context`] and starts loading
//! 2. [`LoadEvent`]s arrive as user events: progress goes to the status slot,
//!    `Loaded` installs the model into the [`FrameLoop`] and publishes its
//!    statistics, `Failed` shows the reason and hides the preview
//! 3. every `RedrawRequested` syncs the fullscreen state into the frame loop
//!    and runs one tick (or draws the background while nothing is loaded)
//! 4. `exiting` stops the frame loop and cancels a pending load
//!
//! `F` toggles fullscreen, which is the viewer's immersive mode.

use std::{fmt::Debug, sync::Arc};

use cgmath::Deg;
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    keyboard::{Key, NamedKey},
    window::{Fullscreen, Window},
};

use crate::{
    camera::{OrbitController, Projection},
    context::{Context, colour_from_hex},
    diagnostics::report::{self, LogSink, StatsSink},
    frame_loop::{FrameLoop, SystemClock},
    options::PreviewOptions,
    overlay::OverlaySurface,
    resources::{self, LoadEvent, LoadTask},
    viewport::ViewportConfig,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

type PreviewLoop = FrameLoop<Context, OrbitController, Box<dyn OverlaySurface>>;

pub(crate) enum PreviewEvent {
    #[allow(dead_code)]
    Initialized(Context),
    Load(LoadEvent),
    #[allow(dead_code)]
    Exit,
}

impl Debug for PreviewEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized(_) => f.write_str("Initialized"),
            Self::Load(event) => f.debug_tuple("Load").field(event).finish(),
            Self::Exit => f.write_str("Exit"),
        }
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<PreviewEvent>,
    source: String,
    options: PreviewOptions,
    frame_loop: Option<PreviewLoop>,
    sink: Box<dyn StatsSink>,
    load: Option<LoadTask>,
}

impl App {
    fn new(
        event_loop: &EventLoop<PreviewEvent>,
        source: String,
        options: PreviewOptions,
    ) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            source,
            options,
            frame_loop: None,
            sink: stats_sink(),
            load: None,
        })
    }

    /// Size of the pane: the configured size, else the window's.
    fn pane_size(&self, window: &Window) -> ViewportConfig {
        let size = window.inner_size();
        ViewportConfig::new(
            self.options.width.unwrap_or(size.width),
            self.options.height.unwrap_or(size.height),
        )
    }

    fn init_frame_loop(&mut self, mut ctx: Context) {
        let pane = self.pane_size(&ctx.window);
        ctx.resize(pane.width, pane.height);
        let projection = Projection::new(
            pane.width,
            pane.height,
            Deg(self.options.fov),
            self.options.near,
            self.options.far,
        );
        let window = ctx.window.clone();
        let frame_loop = FrameLoop::new(
            ctx,
            OrbitController::default(),
            projection,
            pane,
            overlay_surface(),
            Box::new(SystemClock::new()),
        );
        self.frame_loop = Some(frame_loop);
        self.start_load();
        window.request_redraw();
    }

    fn start_load(&mut self) {
        let source = self.source.clone();
        let assets_dir = self.options.assets_dir.clone();
        let proxy = self.proxy.clone();
        let (load, task) = LoadTask::new(async move {
            resources::load_model(&source, &assets_dir, &mut |event| {
                if proxy.send_event(PreviewEvent::Load(event)).is_err() {
                    log::warn!("Event loop closed before the model finished loading");
                }
            })
            .await
        });
        self.load = Some(task);

        #[cfg(not(target_arch = "wasm32"))]
        {
            if self.async_runtime.block_on(load).is_err() {
                log::info!("Model load cancelled");
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            wasm_bindgen_futures::spawn_local(async move {
                if load.await.is_err() {
                    log::info!("Model load cancelled");
                }
            });
        }
    }

    fn handle_load_event(&mut self, event: LoadEvent) {
        match event {
            LoadEvent::Progress(fraction) => report::show_progress(&mut *self.sink, fraction),
            LoadEvent::Loaded(model) => {
                self.load = None;
                let Some(frame_loop) = self.frame_loop.as_mut() else {
                    log::warn!("Model arrived before the renderer was ready");
                    return;
                };
                report::show_loaded(&mut *self.sink);
                let snapshot = frame_loop.install(model, self.options.fov);
                report::publish(&snapshot, &mut *self.sink);
                frame_loop.renderer().window.request_redraw();
            }
            LoadEvent::Failed(reason) => {
                self.load = None;
                report::show_error(&mut *self.sink, &reason);
            }
        }
    }

    fn redraw(&mut self) {
        let Some(frame_loop) = self.frame_loop.as_mut() else {
            return;
        };
        let window = frame_loop.renderer().window.clone();
        frame_loop.set_immersive(window.fullscreen().is_some());

        let result = if frame_loop.is_running() {
            frame_loop.tick()
        } else {
            frame_loop.render_idle()
        };
        match result {
            Ok(()) => {}
            // Reconfigure the surface if it's lost or outdated
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = window.inner_size();
                frame_loop.renderer_mut().resize(size.width, size.height);
            }
            Err(e) => {
                log::error!("Unable to render {}", e);
            }
        }
        window.request_redraw();
    }
}

fn stats_sink() -> Box<dyn StatsSink> {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(sink) = report::DocumentSink::new() {
            return Box::new(sink);
        }
    }
    Box::new(LogSink::default())
}

fn overlay_surface() -> Box<dyn OverlaySurface> {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(surface) = crate::overlay::DocumentSurface::new() {
            return Box::new(surface);
        }
    }
    Box::new(crate::overlay::HeadlessSurface::new())
}

fn toggle_fullscreen(window: &Window) {
    if window.fullscreen().is_some() {
        window.set_fullscreen(None);
    } else {
        window.set_fullscreen(Some(Fullscreen::Borderless(None)));
    }
}

impl ApplicationHandler<PreviewEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.frame_loop.is_some() {
            return;
        }

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("Model preview");
        if let (Some(width), Some(height)) = (self.options.width, self.options.height) {
            window_attributes =
                window_attributes.with_inner_size(winit::dpi::PhysicalSize::new(width, height));
        }

        #[cfg(target_arch = "wasm32")]
        {
            use winit::platform::web::WindowAttributesExtWebSys;

            let window = wgpu::web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document
                .get_element_by_id(&self.options.canvas_id)
                .unwrap_throw();
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Cannot create the preview window: {}", e);
                event_loop.exit();
                return;
            }
        };
        let clear_colour = colour_from_hex(self.options.clear_colour);

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self
                .async_runtime
                .block_on(Context::new(window, clear_colour))
            {
                Ok(ctx) => self.init_frame_loop(ctx),
                Err(e) => {
                    log::error!("Cannot create the GPU context: {:#}", e);
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match Context::new(window, clear_colour).await {
                    Ok(ctx) => {
                        assert!(proxy.send_event(PreviewEvent::Initialized(ctx)).is_ok());
                    }
                    Err(e) => {
                        log::error!("Cannot create the GPU context: {:#}", e);
                        let _ = proxy.send_event(PreviewEvent::Exit);
                    }
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: PreviewEvent) {
        match event {
            // This is the message from our wasm `spawn_local`
            PreviewEvent::Initialized(ctx) => self.init_frame_loop(ctx),
            PreviewEvent::Load(event) => self.handle_load_event(event),
            PreviewEvent::Exit => event_loop.exit(),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let (Some(frame_loop), DeviceEvent::MouseMotion { delta: (dx, dy) }) =
            (self.frame_loop.as_mut(), event)
        {
            frame_loop.controls_mut().handle_mouse(dx, dy);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        if let WindowEvent::RedrawRequested = event {
            self.redraw();
            return;
        }
        let fixed_pane = self.options.width.is_some() && self.options.height.is_some();
        let Some(frame_loop) = self.frame_loop.as_mut() else {
            return;
        };

        frame_loop.controls_mut().handle_window_events(&event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                let fullscreen = frame_loop.renderer().window.fullscreen().is_some();
                frame_loop.resize_window(ViewportConfig::from(size), fullscreen, !fixed_pane);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Character(ref c),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } if c.eq_ignore_ascii_case("f") => {
                toggle_fullscreen(&frame_loop.renderer().window);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } if frame_loop.is_immersive() => {
                frame_loop.renderer().window.set_fullscreen(None);
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(frame_loop) = self.frame_loop.as_mut() {
            frame_loop.stop();
        }
        if let Some(load) = self.load.take() {
            load.cancel();
        }
    }
}

/// Open a viewer for `source` and run until the window closes.
pub fn run(source: &str, options: PreviewOptions) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    let event_loop: EventLoop<PreviewEvent> = EventLoop::with_user_event().build()?;

    let mut app = App::new(&event_loop, source.to_string(), options)?;

    event_loop.run_app(&mut app)?;

    Ok(())
}

/// Web entry point: preview `source` in the canvas with id `canvas_id`.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(js_name = showModel)]
pub fn show_model(source: String, canvas_id: String) -> Result<(), JsValue> {
    let options = PreviewOptions {
        canvas_id,
        ..Default::default()
    };
    run(&source, options).map_err(|e| JsValue::from_str(&format!("{:#}", e)))
}
