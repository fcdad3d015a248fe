use std::{path::Path, sync::Arc, time::Instant};

use glam::{Mat4, Vec3};
use splash::{
    app::SplashApp,
    error::SplashError,
    gpu::{render_context::RenderContext, shader_composer::ShaderComposer, texture::DepthTarget},
    options::SplashOptions,
    renderer::SplashRenderer,
    scene::SceneGraph,
};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

const USAGE: &str = "usage: splash [OPTIONS.toml]

The splash model and textures are not bundled. Point the [assets] section
of an options file at them:

    [assets]
    model_path = \"path/to/dome.glb\"
    sprite_path = \"path/to/circle.png\"
    noise_path = \"path/to/noise.jpg\"

Without a file the defaults under assets/models and assets/textures are used.";

/// Camera direction, from the splash towards the eye.
const VIEW_DIR: Vec3 = Vec3::new(0.0, 0.45, 0.9);

/// GPU state that exists once the window does.
struct Gpu {
    context: RenderContext,
    composer: ShaderComposer,
    renderer: Option<SplashRenderer>,
}

struct ViewerApp {
    window: Option<Arc<Window>>,
    gpu: Option<Gpu>,
    splash: SplashApp,
    scene: SceneGraph,
    started: Instant,
    /// Largest splash radius seen so far; the camera only ever backs away.
    fit_radius: f32,
}

impl ViewerApp {
    fn new(splash: SplashApp) -> Self {
        Self {
            window: None,
            gpu: None,
            splash,
            scene: SceneGraph::new(),
            started: Instant::now(),
            fit_radius: 0.0,
        }
    }

    fn init_gpu(window: &Arc<Window>) -> Result<Gpu, SplashError> {
        let size = window.inner_size();
        let context =
            pollster::block_on(RenderContext::new(Arc::clone(window), (size.width, size.height)))?;
        Ok(Gpu {
            context,
            composer: ShaderComposer::new()?,
            renderer: None,
        })
    }

    /// View-projection matrix framing every instance drawn so far.
    fn camera(&mut self, model: Mat4, aspect: f32) -> Mat4 {
        let shrink = self.splash.options().render.vertex_shrink;
        let mut target = Vec3::ZERO;
        if let Some((lo, hi)) = self.splash.splash().and_then(|s| s.bounds(shrink)) {
            let (a, b) = (model.transform_point3(lo), model.transform_point3(hi));
            target = (a + b) * 0.5;
            self.fit_radius = self.fit_radius.max((b - a).length() * 0.5);
        }
        let radius = if self.fit_radius > 0.0 { self.fit_radius } else { 1.0 };
        let eye = target + VIEW_DIR.normalize() * radius * 3.0;
        let view = Mat4::look_at_rh(eye, target, Vec3::Y);
        let proj = Mat4::perspective_rh(45f32.to_radians(), aspect, radius * 0.01, radius * 20.0);
        proj * view
    }

    fn redraw(&mut self) -> Result<(), wgpu::SurfaceError> {
        let Some(mut gpu) = self.gpu.take() else {
            return Ok(());
        };
        let result = self.render(&mut gpu);
        self.gpu = Some(gpu);
        result
    }

    fn render(&mut self, gpu: &mut Gpu) -> Result<(), wgpu::SurfaceError> {
        let timestamp_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        let _ = self.splash.frame(&mut self.scene, timestamp_ms);

        if gpu.renderer.is_none() {
            if let Some(splash) = self.splash.splash() {
                match SplashRenderer::new(
                    &gpu.context,
                    splash,
                    &self.splash.options().render,
                    Some(DepthTarget::FORMAT),
                    &mut gpu.composer,
                ) {
                    Ok(renderer) => gpu.renderer = Some(renderer),
                    Err(e) => {
                        log::error!("failed to build splash renderer: {e}");
                        self.splash.teardown(&mut self.scene);
                    }
                }
            }
        }

        let model = self.splash.model_matrix(&self.scene).unwrap_or(Mat4::IDENTITY);
        let view_proj = self.camera(model, gpu.context.aspect());
        if let (Some(renderer), Some(splash)) = (&mut gpu.renderer, self.splash.splash_mut()) {
            let _ = renderer.prepare(&gpu.context, splash, view_proj, model);
        }

        let mut frame = gpu.context.begin_frame()?;
        {
            let mut pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Splash Viewer Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: gpu.context.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            if let Some(renderer) = &gpu.renderer {
                renderer.draw(&mut pass);
            }
        }
        gpu.context.present(frame);
        Ok(())
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attrs = Window::default_attributes().with_title("Splash");
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        match Self::init_gpu(&window) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => {
                log::error!("{e}");
                event_loop.exit();
                return;
            }
        }

        if let Err(e) = self.splash.activate() {
            log::error!("{e}");
        }
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.splash.teardown(&mut self.scene);
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.context.resize(size.width, size.height);
                }
            }

            WindowEvent::RedrawRequested => {
                match self.redraw() {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                        if let Some(gpu) = &mut self.gpu {
                            gpu.context.reconfigure();
                        }
                    }
                    Err(e) => log::error!("render error: {e:?}"),
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => (),
        }
    }
}

fn main() -> Result<(), SplashError> {
    env_logger::init();

    let options = match std::env::args().nth(1).as_deref() {
        Some("-h" | "--help") => {
            log::info!("{USAGE}");
            return Ok(());
        }
        Some(path) => SplashOptions::load(Path::new(path))?,
        None => SplashOptions::default(),
    };

    let missing = options.assets.missing_files();
    if missing.contains(&options.assets.model_path.as_str()) {
        log::error!("splash model not found: {}\n\n{USAGE}", options.assets.model_path);
        return Err(SplashError::AssetLoad(options.assets.model_path.clone()));
    }
    for path in missing {
        log::warn!("texture not found, a white placeholder will be used: {path}");
    }

    let mut app = ViewerApp::new(SplashApp::from_files(options)?);
    let event_loop = EventLoop::new().map_err(|e| SplashError::Viewer(e.to_string()))?;
    event_loop.set_control_flow(ControlFlow::Poll);
    event_loop
        .run_app(&mut app)
        .map_err(|e| SplashError::Viewer(e.to_string()))
}
