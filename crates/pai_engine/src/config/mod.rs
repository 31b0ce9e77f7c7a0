//! Configuration system
//!
//! Renderer settings are plain serde structs that load from TOML or RON. Every
//! field has a default, so a config file only needs the keys it changes.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// On-disk configuration format, picked from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.toml`
    Toml,
    /// `.ron`
    Ron,
}

impl ConfigFormat {
    /// Detect the format of `path` from its extension
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Parse configuration text in the given format
    fn parse(contents: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        match format {
            ConfigFormat::Toml => toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
            ConfigFormat::Ron => ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    /// Render the configuration as text in the given format
    fn to_text(&self, format: ConfigFormat) -> Result<String, ConfigError> {
        match format {
            ConfigFormat::Toml => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
            }
            ConfigFormat::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string())),
        }
    }

    /// Load configuration from a `.toml` or `.ron` file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents, format)
    }

    /// Save configuration to a `.toml` or `.ron` file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = self.to_text(ConfigFormat::from_path(path)?)?;
        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A referenced file does not exist
    #[error("File not found: {0}")]
    MissingFile(String),
}

/// Vertex and fragment SPIR-V paths for one pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderConfig {
    /// Path to the vertex shader SPIR-V file
    pub vertex_shader_path: String,
    /// Path to the fragment shader SPIR-V file
    pub fragment_shader_path: String,
}

impl ShaderConfig {
    /// Directories probed by [`ShaderConfig::with_path_resolution`], in order
    ///
    /// The first entry is where the build script writes compiled shaders.
    pub const SEARCH_DIRS: [&'static str; 5] = [
        "target/shaders/",
        "shaders/",
        "resources/shaders/",
        "../shaders/",
        "./",
    ];

    /// Create a new shader configuration
    pub fn new(vertex_path: impl Into<String>, fragment_path: impl Into<String>) -> Self {
        Self {
            vertex_shader_path: vertex_path.into(),
            fragment_shader_path: fragment_path.into(),
        }
    }

    /// Create shader config with automatic path resolution
    ///
    /// Each file is looked up in [`Self::SEARCH_DIRS`] so the host can run from
    /// the workspace root or from its own directory. Unresolved files fall back
    /// to `target/shaders/`, where the build script writes them.
    pub fn with_path_resolution(vertex_file: &str, fragment_file: &str) -> Self {
        Self::new(Self::locate(vertex_file), Self::locate(fragment_file))
    }

    fn locate(file: &str) -> String {
        Self::SEARCH_DIRS
            .iter()
            .map(|dir| format!("{dir}{file}"))
            .find(|candidate| Path::new(candidate).exists())
            .unwrap_or_else(|| format!("{}{file}", Self::SEARCH_DIRS[0]))
    }

    /// Shader config pointing at the build output directory, without probing
    pub fn from_build_output(vertex_file: &str, fragment_file: &str) -> Self {
        Self::new(
            format!("{}{vertex_file}", Self::SEARCH_DIRS[0]),
            format!("{}{fragment_file}", Self::SEARCH_DIRS[0]),
        )
    }

    /// Re-resolve paths that do not exist by their file name
    ///
    /// Existing paths are kept as configured.
    pub fn resolved(&self) -> Self {
        let resolve = |path: &str| {
            if Path::new(path).exists() {
                return path.to_string();
            }
            let file = Path::new(path)
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or(path);
            Self::locate(file)
        };
        Self::new(resolve(&self.vertex_shader_path), resolve(&self.fragment_shader_path))
    }

    /// Check that both shader files exist
    ///
    /// Runs before shader modules are loaded for a pipeline.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for path in [&self.vertex_shader_path, &self.fragment_shader_path] {
            if !Path::new(path).exists() {
                return Err(ConfigError::MissingFile(path.clone()));
            }
        }
        Ok(())
    }

    /// Shaders for the base geometry pipeline
    pub fn base_geometry() -> Self {
        Self::from_build_output("simple_shader.vert.spv", "simple_shader.frag.spv")
    }

    /// Shaders for the point light billboard pipeline
    pub fn point_light() -> Self {
        Self::from_build_output("point_light.vert.spv", "point_light.frag.spv")
    }
}

/// Triangle and recursion depth of the generated base mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Number of subdivision levels
    pub sierpinski_depth: i32,
    /// Bottom-left corner in clip space
    pub left: [f32; 2],
    /// Bottom-right corner in clip space
    pub right: [f32; 2],
    /// Apex in clip space
    pub top: [f32; 2],
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            sierpinski_depth: 1,
            left: [-0.5, 0.5],
            right: [0.5, 0.5],
            top: [0.0, -0.5],
        }
    }
}

/// Orbit applied to every point light each frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightOrbitConfig {
    /// Radians per second
    pub angular_velocity: f32,
    /// Rotation axis, normalized before use
    pub axis: [f32; 3],
}

impl Default for LightOrbitConfig {
    fn default() -> Self {
        Self {
            angular_velocity: 0.5,
            axis: [-0.5, -1.0, 0.0],
        }
    }
}

/// # Renderer Configuration
///
/// Everything the frame renderer and the point light system read at setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Application name, used for logging
    pub application_name: String,
    /// Color attachment clear value (RGBA)
    pub clear_color: [f32; 4],
    /// Ambient light color, intensity in `w`
    pub ambient_light_color: [f32; 4],
    /// Base geometry shaders
    pub base_shaders: ShaderConfig,
    /// Point light billboard shaders
    pub point_light_shaders: ShaderConfig,
    /// Base mesh generation
    pub mesh: MeshConfig,
    /// Point light animation
    pub light_orbit: LightOrbitConfig,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            application_name: "pai".to_string(),
            clear_color: [0.0, 0.0, 0.0, 1.0],
            ambient_light_color: [1.0, 1.0, 1.0, 0.02],
            base_shaders: ShaderConfig::base_geometry(),
            point_light_shaders: ShaderConfig::point_light(),
            mesh: MeshConfig::default(),
            light_orbit: LightOrbitConfig::default(),
        }
    }
}

impl Config for RendererConfig {}

impl RendererConfig {
    /// Create a configuration with the given application name
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            application_name: app_name.into(),
            ..Self::default()
        }
    }

    /// Set the clear color
    pub fn with_clear_color(mut self, color: [f32; 4]) -> Self {
        self.clear_color = color;
        self
    }

    /// Set the base mesh subdivision depth
    pub fn with_sierpinski_depth(mut self, depth: i32) -> Self {
        self.mesh.sierpinski_depth = depth;
        self
    }

    /// Set the light orbit
    pub fn with_light_orbit(mut self, orbit: LightOrbitConfig) -> Self {
        self.light_orbit = orbit;
        self
    }

    /// Locate shader files that are missing at their configured paths
    ///
    /// Defaults and parsed files never touch the disk; hosts call this once
    /// after loading, before pipelines are created.
    pub fn resolve_shader_paths(&mut self) {
        self.base_shaders = self.base_shaders.resolved();
        self.point_light_shaders = self.point_light_shaders.resolved();
    }
}
