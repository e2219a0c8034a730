use cgmath::{Vector3, Zero};
use log::{info, warn};

use super::{
    collision::{collides_with_any, Footprint},
    model::Model,
};
use crate::{
    assets::AssetLoader,
    config::{CameraConfig, CameraMode, FlagConfig, ModelConfig, SceneConfig},
    error::Result,
    gfx::{
        camera::{
            ActiveCamera, Camera, CameraController, CameraManager, FirstPersonCamera, MovementKey,
            OrbitCamera,
        },
        rendering::context::RenderContext,
        resources::{material::Material, shader_program::ShaderProgram},
    },
};

pub const DEFAULT_VERTEX_SHADER: &str = include_str!("../shaders/phong_vert.wgsl");
pub const DEFAULT_FRAGMENT_SHADER: &str = include_str!("../shaders/phong_frag.wgsl");

/// Models, one shader program and one camera, drawn in configuration order
///
/// Nothing touches the GPU until [`Scene::start`]. Input handlers only act
/// between `start` and `stop`.
pub struct Scene {
    config: SceneConfig,
    loader: AssetLoader,
    program: ShaderProgram,
    models: Vec<Model>,
    camera_manager: CameraManager,
    width: u32,
    height: u32,
    listening: bool,
    stopped: bool,
}

impl Scene {
    pub fn new(config: SceneConfig, loader: AssetLoader) -> Self {
        let camera_manager = build_camera(&config.camera);
        Self {
            config,
            loader,
            program: ShaderProgram::new(),
            models: Vec::new(),
            camera_manager,
            width: 1,
            height: 1,
            listening: false,
            stopped: false,
        }
    }

    /// Compiles the program and requests every mesh and texture
    ///
    /// Returns once the program is ready; model assets keep arriving over the
    /// following frames.
    pub fn start(&mut self, ctx: &mut dyn RenderContext) -> Result<()> {
        let vertex_src = self.shader_source(self.config.vertex_shader.clone(), DEFAULT_VERTEX_SHADER)?;
        let fragment_src =
            self.shader_source(self.config.fragment_shader.clone(), DEFAULT_FRAGMENT_SHADER)?;
        self.program.load_shaders(ctx, &vertex_src, &fragment_src)?;

        for mut model in self.models.drain(..) {
            model.destroy(ctx);
        }
        if self.config.flag.enabled {
            let flag = flag_model(ctx, &self.loader, &self.config.flag);
            self.models.push(flag);
        }
        for model_config in &self.config.models {
            let model = configured_model(ctx, &self.loader, model_config);
            self.models.push(model);
        }

        self.camera_manager = build_camera(&self.config.camera);
        self.stopped = false;
        self.listening = true;

        info!("Scene started with {} models", self.models.len());
        Ok(())
    }

    fn shader_source(&self, path: Option<String>, builtin: &str) -> Result<String> {
        match path {
            Some(path) => self.loader.request_text(&path).wait(),
            None => Ok(builtin.to_string()),
        }
    }

    /// Renders one frame; does nothing once stopped
    ///
    /// Finished asset fetches are applied first. A failed fetch is logged and
    /// the model keeps drawing in its degraded state.
    pub fn draw_frame(&mut self, ctx: &mut dyn RenderContext) {
        if self.stopped || !self.program.is_compiled() {
            return;
        }

        for model in &mut self.models {
            if let Err(e) = model.poll(ctx) {
                warn!("Model '{}': {}", model.name(), e);
            }
        }

        ctx.viewport(self.width, self.height);
        ctx.clear(self.config.background_color);

        let program = &self.program;
        program.use_program(ctx);

        let aspect = self.width as f32 / self.height as f32;
        let camera = self.camera_manager.camera();
        program.set_uniform_matrix4fv(ctx, "u_projection", camera.projection_matrix(aspect));
        program.set_uniform_matrix4fv(ctx, "u_view", camera.view_matrix());
        program.set_uniform_3f(ctx, "u_viewPosition", camera.position());

        let light = &self.config.light;
        program.set_uniform_3f(ctx, "u_light.position", light.position.into());
        program.set_uniform_1f(ctx, "u_light.intensity", light.intensity);
        program.set_uniform_3f(ctx, "u_light.diffuseColor", light.diffuse_color.into());
        program.set_uniform_3f(ctx, "u_light.specularColor", light.specular_color.into());
        program.set_uniform_1f(ctx, "u_light.attenuation.constant", light.attenuation_constant);
        program.set_uniform_1f(ctx, "u_light.attenuation.linear", light.attenuation_linear);
        program.set_uniform_1f(ctx, "u_light.attenuation.quadratic", light.attenuation_quadratic);
        program.set_uniform_3f(ctx, "u_ambientColor", light.ambient_color.into());
        program.set_uniform_1f(ctx, "u_ambientIntensity", light.ambient_intensity);

        for model in &self.models {
            model.draw(ctx, program);
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
    }

    /// Moves the camera one step
    ///
    /// A first-person step into a solid model is rejected; the result is then
    /// held inside the floor. An orbit camera pans its target instead.
    pub fn on_key_down(&mut self, key: MovementKey) {
        if !self.listening {
            return;
        }
        let offset = self.camera_manager.movement_offset(key);
        let solids: Vec<Footprint> = self
            .models
            .iter()
            .filter(|m| m.is_solid())
            .map(Model::footprint)
            .collect();
        let bounds = self.floor_footprint();

        match &mut self.camera_manager.camera {
            ActiveCamera::FirstPerson(camera) => {
                let candidate = camera.candidate_position(offset);
                let mut next = if collides_with_any(candidate.x, candidate.z, &solids) {
                    camera.position()
                } else {
                    candidate
                };
                if let Some(bounds) = bounds {
                    (next.x, next.z) = bounds.clamp(next.x, next.z);
                }
                camera.set_position(next);
            }
            ActiveCamera::Orbit { camera, .. } => camera.pan(offset),
        }
    }

    /// Mouse travel in pixels; only turns the camera while the button is held
    pub fn on_mouse_move(&mut self, dx: f32, dy: f32, button_held: bool) {
        if self.listening && button_held {
            self.camera_manager.process_mouse_look(dx, dy);
        }
    }

    /// Wheel travel in lines; zooms an orbit camera
    pub fn on_mouse_wheel(&mut self, delta: f32) {
        if self.listening {
            self.camera_manager.process_scroll(delta);
        }
    }

    fn floor_footprint(&self) -> Option<Footprint> {
        self.models
            .iter()
            .find(|m| m.is_floor() && m.mesh().is_loaded())
            .map(Model::footprint)
    }

    /// Every model has its mesh and every requested texture
    pub fn is_fully_loaded(&self) -> bool {
        self.models.iter().all(Model::is_loaded)
    }

    /// Blocks until every outstanding fetch has finished
    ///
    /// Every model is waited on; the first failure is returned.
    pub fn wait_until_loaded(&mut self, ctx: &mut dyn RenderContext) -> Result<()> {
        let mut first_error = None;
        for model in &mut self.models {
            if let Err(e) = model.wait_for_loads(ctx) {
                warn!("Model '{}': {}", model.name(), e);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Halts drawing, drops input and releases every GPU handle
    ///
    /// Fetches still in flight are abandoned and their results discarded.
    pub fn stop(&mut self, ctx: &mut dyn RenderContext) {
        self.stopped = true;
        self.listening = false;
        self.program.destroy(ctx);
        for model in &mut self.models {
            model.destroy(ctx);
        }
        info!("Scene stopped");
    }

    pub fn camera_manager(&self) -> &CameraManager {
        &self.camera_manager
    }

    pub fn camera(&self) -> &dyn Camera {
        self.camera_manager.camera()
    }

    /// First-person camera, when that is the active variant
    pub fn first_person_camera_mut(&mut self) -> Option<&mut FirstPersonCamera> {
        match &mut self.camera_manager.camera {
            ActiveCamera::FirstPerson(camera) => Some(camera),
            ActiveCamera::Orbit { .. } => None,
        }
    }

    pub fn models(&self) -> &[Model] {
        &self.models
    }

    pub fn model(&self, name: &str) -> Option<&Model> {
        self.models.iter().find(|m| m.name() == name)
    }

    pub fn model_mut(&mut self, name: &str) -> Option<&mut Model> {
        self.models.iter_mut().find(|m| m.name() == name)
    }

    pub fn program(&self) -> &ShaderProgram {
        &self.program
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

fn build_camera(config: &CameraConfig) -> CameraManager {
    let controller = CameraController::new(config.move_speed, config.angle_speed, config.zoom_speed);
    let camera = match config.mode {
        CameraMode::FirstPerson => {
            let mut camera = FirstPersonCamera::new();
            camera.set_fov(config.fov);
            camera.set_position(config.position.into());
            camera.rotate(config.pitch, config.yaw);
            ActiveCamera::FirstPerson(camera)
        }
        CameraMode::Orbit => {
            let mut camera = OrbitCamera::new();
            camera.set_fov(config.fov);
            camera.set_look_at(Vector3::zero());
            camera.set_radius(config.orbit_radius);
            camera.rotate(config.pitch, config.yaw);
            ActiveCamera::orbit(camera)
        }
    };
    CameraManager::new(camera, controller)
}

fn configured_model(ctx: &mut dyn RenderContext, loader: &AssetLoader, config: &ModelConfig) -> Model {
    let mut model = Model::new(ctx, loader, &config.name, &config.mesh, config.texture.as_deref());
    model.set_position(config.position.into());
    let [roll, pitch, yaw] = config.rotation_deg;
    model.rotate(roll, pitch, yaw);
    model.scale_uniform(config.scale);
    model.material = Material::default().with_specular(config.specular_coefficient, config.shininess);
    model.set_solid(config.solid);
    model.set_floor(config.floor);
    model
}

fn flag_model(ctx: &mut dyn RenderContext, loader: &AssetLoader, config: &FlagConfig) -> Model {
    let corners = config.corners.map(Vector3::from);
    Model::quad(
        ctx,
        loader,
        "flag",
        corners,
        config.texture.as_deref(),
        config.fallback_color,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assets::MemorySource,
        error::RenderError,
        gfx::rendering::{
            context::UniformValue,
            recording::{Call, RecordingContext},
        },
    };
    use approx::assert_relative_eq;

    const BLOCK: &str = "v -1 0 -1\nv 1 0 -1\nv 1 1 1\nv -1 1 1\nf 1 2 3\nf 1 3 4\n";
    const FLOOR: &str = "v -20 0 -20\nv 20 0 -20\nv 20 0 20\nv -20 0 20\nf 1 2 3 4\n";

    fn model(name: &str, mesh: &str, position: [f32; 3]) -> ModelConfig {
        ModelConfig {
            name: name.to_string(),
            mesh: mesh.to_string(),
            position,
            ..ModelConfig::default()
        }
    }

    fn small_config() -> SceneConfig {
        let block = ModelConfig {
            solid: true,
            ..model("block", "block.obj", [0.0, 0.0, 8.0])
        };
        let floor = ModelConfig {
            floor: true,
            ..model("floor", "floor.obj", [0.0, 0.0, 0.0])
        };
        SceneConfig {
            flag: FlagConfig {
                texture: None,
                ..FlagConfig::default()
            },
            models: vec![block, floor],
            ..SceneConfig::default()
        }
    }

    fn source() -> MemorySource {
        MemorySource::new()
            .with_text("block.obj", BLOCK)
            .with_text("floor.obj", FLOOR)
    }

    fn started(config: SceneConfig) -> (Scene, RecordingContext) {
        let mut ctx = RecordingContext::new();
        let mut scene = Scene::new(config, AssetLoader::new(source()));
        scene.start(&mut ctx).unwrap();
        scene.wait_until_loaded(&mut ctx).unwrap();
        scene.resize(800, 600);
        (scene, ctx)
    }

    #[test]
    fn test_start_places_camera() {
        let (scene, _) = started(small_config());
        let camera = scene.camera();
        assert_eq!(camera.position(), Vector3::new(0.0, 1.0, 10.0));
        assert_relative_eq!(camera.direction().z, -1.0, epsilon = 1e-5);
        assert!(camera.has_valid_basis());
        assert!(scene.is_listening());
    }

    #[test]
    fn test_flag_is_drawn_first() {
        let (mut scene, mut ctx) = started(small_config());
        assert_eq!(scene.models()[0].name(), "flag");
        ctx.clear_calls();

        scene.draw_frame(&mut ctx);
        // Flag quad, then block (2 triangles), then floor (fan of 4).
        assert_eq!(ctx.draws(), vec![6, 6, 9]);
        assert_eq!(ctx.calls[0], Call::Viewport(800, 600));
        assert_eq!(ctx.calls[1], Call::Clear([0.0, 0.0, 0.0, 1.0]));
    }

    #[test]
    fn test_frame_sets_global_uniforms_before_models() {
        let (mut scene, mut ctx) = started(small_config());
        ctx.clear_calls();
        scene.draw_frame(&mut ctx);

        let names = ctx.uniform_names();
        assert_eq!(&names[..3], &["u_projection", "u_view", "u_viewPosition"]);
        assert_eq!(names[3], "u_light.position");
        assert_eq!(
            ctx.last_uniform("u_ambientIntensity"),
            Some(UniformValue::Float(3.0))
        );
        assert_eq!(
            ctx.last_uniform("u_viewPosition"),
            Some(UniformValue::Vec3(Vector3::new(0.0, 1.0, 10.0)))
        );
    }

    #[test]
    fn test_unknown_mesh_still_renders_the_rest() {
        let mut config = small_config();
        config.models.push(model("ghost", "ghost.obj", [0.0; 3]));
        let mut ctx = RecordingContext::new();
        let mut scene = Scene::new(config, AssetLoader::new(source()));
        scene.start(&mut ctx).unwrap();

        let err = scene.wait_until_loaded(&mut ctx).unwrap_err();
        assert!(matches!(err, RenderError::AssetLoad { .. }));
        assert!(!err.is_fatal());
        assert!(!scene.is_fully_loaded());

        ctx.clear_calls();
        scene.draw_frame(&mut ctx);
        assert_eq!(ctx.draws().len(), 3);
    }

    #[test]
    fn test_step_into_solid_model_is_rejected() {
        let (mut scene, _) = started(small_config());
        // Block spans z in (7, 9); camera at z = 10 faces -z.
        let speed = 1.5;
        scene.camera_manager.controller.move_speed = speed;
        scene.on_key_down(MovementKey::Forward);
        assert_relative_eq!(scene.camera().position().z, 10.0, epsilon = 1e-5);

        scene.on_key_down(MovementKey::Left);
        assert_relative_eq!(scene.camera().position().x, -1.5, epsilon = 1e-5);
    }

    #[test]
    fn test_floor_bounds_clamp_every_step() {
        let (mut scene, _) = started(small_config());
        scene.camera_manager.controller.move_speed = 15.0;
        scene.on_key_down(MovementKey::Back);
        let position = scene.camera().position();
        assert_relative_eq!(position.z, 20.0, epsilon = 1e-5);
        assert_relative_eq!(position.y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_mirrored_floor_still_clamps() {
        let mut config = small_config();
        config.models[1].scale = -2.0;
        let (mut scene, _) = started(config);
        scene.camera_manager.controller.move_speed = 50.0;
        scene.on_key_down(MovementKey::Back);
        assert_relative_eq!(scene.camera().position().z, 40.0, epsilon = 1e-5);
    }

    #[test]
    fn test_missing_texture_is_not_fully_loaded() {
        let mut config = small_config();
        config.models[1].texture = Some("missing.png".to_string());
        let mut ctx = RecordingContext::new();
        let mut scene = Scene::new(config, AssetLoader::new(source()));
        scene.start(&mut ctx).unwrap();

        let err = scene.wait_until_loaded(&mut ctx).unwrap_err();
        assert!(matches!(err, RenderError::AssetLoad { .. }));
        assert!(!scene.is_fully_loaded());
    }

    #[test]
    fn test_restart_releases_previous_models() {
        let (mut scene, mut ctx) = started(small_config());
        let vertex_arrays = ctx.live_vertex_arrays.len();
        let textures = ctx.live_textures.len();

        scene.start(&mut ctx).unwrap();
        scene.wait_until_loaded(&mut ctx).unwrap();
        assert_eq!(scene.models().len(), 3);
        assert_eq!(ctx.live_vertex_arrays.len(), vertex_arrays);
        assert_eq!(ctx.live_textures.len(), textures);
    }

    #[test]
    fn test_mouse_look_needs_button() {
        let (mut scene, _) = started(small_config());
        let before = scene.camera().direction();
        scene.on_mouse_move(100.0, 0.0, false);
        assert_eq!(scene.camera().direction(), before);

        scene.on_mouse_move(100.0, 0.0, true);
        assert!(scene.camera().direction() != before);
        assert!(scene.camera().has_valid_basis());
    }

    #[test]
    fn test_orbit_wheel_and_pan() {
        let mut config = small_config();
        config.camera.mode = CameraMode::Orbit;
        let (mut scene, _) = started(config);

        scene.on_mouse_wheel(3.0);
        match &scene.camera_manager().camera {
            ActiveCamera::Orbit { camera, .. } => assert_relative_eq!(camera.radius(), 7.0),
            ActiveCamera::FirstPerson(_) => panic!("expected orbit camera"),
        }
        assert!(scene.first_person_camera_mut().is_none());

        let target = scene.camera().target();
        scene.on_key_down(MovementKey::Right);
        assert!(scene.camera().target() != target);
    }

    #[test]
    fn test_compile_failure_is_fatal() {
        let mut ctx = RecordingContext::new();
        ctx.reject_programs = true;
        let mut scene = Scene::new(small_config(), AssetLoader::new(source()));
        let err = scene.start(&mut ctx).unwrap_err();
        assert!(err.is_fatal());
        assert!(scene.models().is_empty());
    }

    #[test]
    fn test_stop_releases_everything_and_ignores_input() {
        let mut ctx = RecordingContext::new();
        let mut scene = Scene::new(small_config(), AssetLoader::new(source()));
        scene.start(&mut ctx).unwrap();
        // Stop before the fetches are applied.
        scene.stop(&mut ctx);
        assert!(!ctx.has_live_resources());

        ctx.clear_calls();
        scene.draw_frame(&mut ctx);
        scene.on_key_down(MovementKey::Forward);
        assert!(ctx.calls.is_empty());
        assert_eq!(scene.camera().position(), Vector3::new(0.0, 1.0, 10.0));
    }

    #[test]
    fn test_custom_shader_paths_use_loader() {
        let mut config = small_config();
        config.vertex_shader = Some("shaders/missing.wgsl".to_string());
        let mut ctx = RecordingContext::new();
        let mut scene = Scene::new(config, AssetLoader::new(source()));
        assert!(matches!(
            scene.start(&mut ctx),
            Err(RenderError::AssetLoad { .. })
        ));
    }
}
