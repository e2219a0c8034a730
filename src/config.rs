//! Scene description loaded from TOML
//!
//! Every section is optional; anything left out falls back to the default
//! scene (an astronaut on a textured floor with a handful of props).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RenderError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CameraMode {
    #[default]
    FirstPerson,
    Orbit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub mode: CameraMode,
    pub position: [f32; 3],
    /// Degrees
    pub pitch: f32,
    /// Degrees
    pub yaw: f32,
    pub fov: f32,
    pub move_speed: f32,
    /// Degrees per pixel of mouse travel
    pub angle_speed: f32,
    pub orbit_radius: f32,
    /// Radius change per wheel line
    pub zoom_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            mode: CameraMode::FirstPerson,
            position: [0.0, 1.0, 10.0],
            pitch: 0.0,
            yaw: 180.0,
            fov: 45.0,
            move_speed: 0.1,
            angle_speed: 0.1,
            orbit_radius: 10.0,
            zoom_speed: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub position: [f32; 3],
    pub intensity: f32,
    pub diffuse_color: [f32; 3],
    pub specular_color: [f32; 3],
    pub attenuation_constant: f32,
    pub attenuation_linear: f32,
    pub attenuation_quadratic: f32,
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            position: [4.0, 4.0, 4.0],
            intensity: 5.0,
            diffuse_color: [1.0, 1.0, 0.9],
            specular_color: [1.0, 1.0, 1.0],
            attenuation_constant: 1.0,
            attenuation_linear: 0.07,
            attenuation_quadratic: 0.017,
            ambient_color: [1.0, 1.0, 0.9],
            ambient_intensity: 3.0,
        }
    }
}

/// One entry in the draw list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub name: String,
    pub mesh: String,
    pub texture: Option<String>,
    pub position: [f32; 3],
    /// Roll, pitch, yaw in degrees
    pub rotation_deg: [f32; 3],
    /// Uniform scale factor
    pub scale: f32,
    pub specular_coefficient: f32,
    pub shininess: f32,
    pub solid: bool,
    pub floor: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            mesh: String::new(),
            texture: None,
            position: [0.0; 3],
            rotation_deg: [0.0; 3],
            scale: 1.0,
            specular_coefficient: 0.5,
            shininess: 150.0,
            solid: false,
            floor: false,
        }
    }
}

impl ModelConfig {
    fn prop(name: &str, mesh: &str, texture: &str, position: [f32; 3], scale: f32) -> Self {
        Self {
            name: name.to_string(),
            mesh: format!("models/{mesh}"),
            texture: Some(format!("textures/{texture}")),
            position,
            scale,
            specular_coefficient: 0.2,
            shininess: 40.0,
            ..Self::default()
        }
    }
}

/// Hand-authored textured quad drawn before every model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagConfig {
    pub enabled: bool,
    /// Counter-clockwise from the bottom-left
    pub corners: [[f32; 3]; 4],
    pub texture: Option<String>,
    /// Colour shown until the texture arrives, or if it never does
    pub fallback_color: [u8; 4],
}

impl Default for FlagConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            corners: [
                [1.5, 2.0, -8.0],
                [3.0, 2.0, -8.0],
                [3.0, 3.0, -8.0],
                [1.5, 3.0, -8.0],
            ],
            texture: Some("textures/flag.jfif".to_string()),
            fallback_color: [255, 0, 255, 255],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Directory every asset path is relative to
    pub assets_root: PathBuf,
    /// WGSL vertex stage; the built-in Phong program when unset
    pub vertex_shader: Option<String>,
    pub fragment_shader: Option<String>,
    pub background_color: [f32; 4],
    pub camera: CameraConfig,
    pub light: LightConfig,
    pub flag: FlagConfig,
    pub models: Vec<ModelConfig>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        let astronaut = ModelConfig {
            specular_coefficient: 0.25,
            solid: true,
            ..ModelConfig::prop("astronaut", "Astronaut.obj", "astronauta.png", [0.0, 0.0, 0.0], 1.0)
        };
        let floor = ModelConfig {
            specular_coefficient: 0.5,
            shininess: 200.0,
            floor: true,
            ..ModelConfig::prop("floor", "floor.obj", "images.jfif", [0.0, 0.0, 0.0], 2.0)
        };
        let moon = ModelConfig::prop("moon", "Earth.obj", "Earth.jpg", [1.0, 15.0, -30.0], 0.5);
        let asteroid = ModelConfig {
            solid: true,
            ..ModelConfig::prop("asteroid", "Rock.obj", "rock_diffuse.png", [-4.0, -1.0, -3.0], 0.02)
        };
        let ship = ModelConfig::prop("nave", "nave.obj", "nave.png", [-5.0, 7.0, 2.0], 1.0);
        let robot = ModelConfig {
            rotation_deg: [-130.0, -110.0, 0.0],
            solid: true,
            ..ModelConfig::prop("robo", "robo.obj", "robo.jpg", [4.0, 0.0, 6.0], 0.1)
        };
        let pole = ModelConfig {
            solid: true,
            ..ModelConfig::prop("cano", "suporte.obj", "metale.jfif", [1.5, -4.0, -8.0], 0.01)
        };

        Self {
            assets_root: PathBuf::from("assets"),
            vertex_shader: None,
            fragment_shader: None,
            background_color: [0.0, 0.0, 0.0, 1.0],
            camera: CameraConfig::default(),
            light: LightConfig::default(),
            flag: FlagConfig::default(),
            models: vec![astronaut, floor, moon, asteroid, ship, robot, pole],
        }
    }
}

impl SceneConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| RenderError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| RenderError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| RenderError::Config(e.to_string()))
    }

    pub fn model(&self, name: &str) -> Option<&ModelConfig> {
        self.models.iter().find(|m| m.name == name)
    }
}
