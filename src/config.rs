use crate::layout::{Focus, InterpolationPlan, LayoutOptions, PlacementOptions, ViewMode};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LayoutConfig {
    pub grid_spacing: Option<f64>,
    pub type_offset: Option<f64>,
    pub focus_scale: Option<f64>,
    pub jitter: Option<bool>,
    pub jitter_amplitude: Option<f64>,
    pub size_scale: Option<f64>,
    pub size_min: Option<f64>,
    pub size_max: Option<f64>,
}

impl LayoutConfig {
    /// Fill a set of placement options, falling back to engine defaults
    pub fn placement_options(&self, default_branch: String) -> PlacementOptions {
        let defaults = PlacementOptions::default();
        let mut size_min = self.size_min.unwrap_or(defaults.size_min);
        let mut size_max = self.size_max.unwrap_or(defaults.size_max);
        if size_min > size_max {
            log::warn!("size_min {size_min} exceeds size_max {size_max}, swapping");
            std::mem::swap(&mut size_min, &mut size_max);
        }
        PlacementOptions {
            grid_spacing: self.grid_spacing.unwrap_or(defaults.grid_spacing),
            type_offset: self.type_offset.unwrap_or(defaults.type_offset),
            focus_scale: self.focus_scale.unwrap_or(defaults.focus_scale),
            jitter: self.jitter.unwrap_or(defaults.jitter),
            jitter_amplitude: self.jitter_amplitude.unwrap_or(defaults.jitter_amplitude),
            size_scale: self.size_scale.unwrap_or(defaults.size_scale),
            size_min,
            size_max,
            default_branch,
            overrides: defaults.overrides,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CameraConfig {
    pub min_distance: Option<f64>,
    pub blend: Option<f64>,
    pub epsilon: Option<f64>,
    pub max_steps: Option<usize>,
}

impl CameraConfig {
    pub fn get_min_distance(&self) -> f64 {
        self.min_distance.unwrap_or(20.0)
    }

    pub fn interpolation_plan(&self) -> InterpolationPlan {
        let defaults = InterpolationPlan::default();
        InterpolationPlan {
            blend: self.blend.unwrap_or(defaults.blend),
            epsilon: self.epsilon.unwrap_or(defaults.epsilon),
            max_steps: self.max_steps.unwrap_or(defaults.max_steps),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub debug: Option<bool>,
    pub default_branch: Option<String>,
    pub commit_history_limit: Option<usize>,
    pub view: Option<ViewMode>,
    pub pretty: Option<bool>,
    pub layout: Option<LayoutConfig>,
    pub camera: Option<CameraConfig>,
}

impl Config {
    pub fn load() -> color_eyre::eyre::Result<Self> {
        let config_path = Self::get_config_path();

        if !config_path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &std::path::Path) -> color_eyre::eyre::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Get the default branch name with a sensible default
    pub fn get_default_branch(&self) -> String {
        self.default_branch
            .clone()
            .unwrap_or_else(|| "main".to_string())
    }

    /// Get the per-branch commit walk limit with a sensible default
    pub fn get_commit_history_limit(&self) -> usize {
        self.commit_history_limit.unwrap_or(500)
    }

    /// Engine options for a given focus
    pub fn layout_options(&self, focus: Focus) -> LayoutOptions {
        LayoutOptions {
            placement: self
                .layout
                .clone()
                .unwrap_or_default()
                .placement_options(self.get_default_branch()),
            focus,
        }
    }

    pub fn camera_config(&self) -> CameraConfig {
        self.camera.clone().unwrap_or_default()
    }

    /// Camera easing parameters handed to the caller alongside a planned view
    pub fn interpolation_plan(&self) -> InterpolationPlan {
        self.camera_config().interpolation_plan()
    }

    fn get_config_path() -> PathBuf {
        config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gitscape")
            .join("config.json")
    }

    pub fn merge_with_args(&self, args: &Args) -> Self {
        let mut layout = self.layout.clone().unwrap_or_default();
        if args.grid_spacing.is_some() {
            layout.grid_spacing = args.grid_spacing;
        }
        if args.no_jitter {
            layout.jitter = Some(false);
        }

        Self {
            debug: if args.debug { Some(true) } else { self.debug },
            default_branch: args
                .default_branch
                .clone()
                .or_else(|| self.default_branch.clone()),
            commit_history_limit: args.commit_history_limit.or(self.commit_history_limit),
            view: args.view.or(self.view),
            pretty: if args.pretty { Some(true) } else { self.pretty },
            layout: Some(layout),
            camera: self.camera.clone(),
        }
    }
}

#[derive(Debug, Clone, clap::Parser)]
#[command(about = "Lay out a repository's branches as a 3D commit pipeline")]
pub struct Args {
    #[arg(short, long, help = "Print version information and exit")]
    pub version: bool,

    #[arg(short, long, help = "Enable debug logging")]
    pub debug: bool,

    #[arg(short, long, help = "JSON snapshot of branch histories", conflicts_with = "repo")]
    pub input: Option<PathBuf>,

    #[arg(short, long, help = "Local git repository to read branches from")]
    pub repo: Option<PathBuf>,

    #[arg(short, long, help = "Write the layout here instead of stdout")]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Also plan a camera view (3d, top or front)")]
    pub view: Option<ViewMode>,

    #[arg(long, help = "Focus on one branch, or 'all'")]
    pub focus: Option<Focus>,

    #[arg(long, help = "Branch drawn as the spine (default: main)")]
    pub default_branch: Option<String>,

    #[arg(long, help = "Distance between consecutive ranks")]
    pub grid_spacing: Option<f64>,

    #[arg(long, help = "Disable hash-seeded jitter")]
    pub no_jitter: bool,

    #[arg(long, help = "Maximum commits walked per branch (default: 500)")]
    pub commit_history_limit: Option<usize>,

    #[arg(long, help = "Pretty-print JSON output")]
    pub pretty: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.debug, None);
        assert_eq!(config.get_default_branch(), "main");
        assert_eq!(config.get_commit_history_limit(), 500);
        assert!(config.view.is_none());
    }

    #[test]
    fn test_merge_with_args() {
        let config = Config {
            debug: Some(false),
            default_branch: Some("trunk".to_string()),
            view: Some(ViewMode::Top),
            layout: Some(LayoutConfig {
                grid_spacing: Some(4.0),
                jitter: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        };

        let args = Args::parse_from([
            "gitscape",
            "--debug",
            "--view",
            "front",
            "--grid-spacing",
            "6",
            "--no-jitter",
        ]);

        let merged = config.merge_with_args(&args);

        assert_eq!(merged.debug, Some(true)); // From args
        assert_eq!(merged.default_branch, Some("trunk".to_string())); // From config
        assert_eq!(merged.view, Some(ViewMode::Front)); // CLI takes precedence
        let layout = merged.layout.unwrap();
        assert_eq!(layout.grid_spacing, Some(6.0));
        assert_eq!(layout.jitter, Some(false));
    }

    #[test]
    fn test_merge_keeps_config_when_args_empty() {
        let config = Config {
            commit_history_limit: Some(50),
            layout: Some(LayoutConfig {
                grid_spacing: Some(4.0),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = config.merge_with_args(&Args::parse_from(["gitscape"]));
        assert_eq!(merged.commit_history_limit, Some(50));
        assert_eq!(merged.layout.unwrap().grid_spacing, Some(4.0));
    }

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from([
            "gitscape",
            "--input",
            "snapshot.json",
            "--focus",
            "feature-x",
            "--view",
            "3d",
            "--pretty",
        ]);
        assert_eq!(args.input, Some(PathBuf::from("snapshot.json")));
        assert_eq!(args.focus, Some(Focus::Branch("feature-x".to_string())));
        assert_eq!(args.view, Some(ViewMode::ThreeD));
        assert!(args.pretty);
        assert!(!args.no_jitter);
    }

    #[test]
    fn test_args_input_conflicts_with_repo() {
        let result = Args::try_parse_from(["gitscape", "--input", "a.json", "--repo", "."]);
        assert!(result.is_err());
    }

    #[test]
    fn test_args_parsing_invalid_view() {
        let result = Args::try_parse_from(["gitscape", "--view", "sideways"]);
        assert!(result.is_err(), "Should fail to parse invalid view mode");
    }

    #[test]
    fn test_layout_options_from_config() {
        let config = Config {
            default_branch: Some("develop".to_string()),
            layout: Some(LayoutConfig {
                focus_scale: Some(0.5),
                size_max: Some(3.0),
                ..Default::default()
            }),
            ..Default::default()
        };
        let options = config.layout_options(Focus::All);
        assert_eq!(options.placement.default_branch, "develop");
        assert_eq!(options.placement.focus_scale, 0.5);
        assert_eq!(options.placement.size_max, 3.0);
        assert_eq!(options.placement.grid_spacing, PlacementOptions::default().grid_spacing);
    }

    #[test]
    fn test_config_deserialize() {
        let json = r#"{"debug": true, "view": "TOP", "camera": {"blend": 0.25}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.debug, Some(true));
        assert_eq!(config.view, Some(ViewMode::Top));
        let camera = config.camera_config();
        assert_eq!(camera.interpolation_plan().blend, 0.25);
        assert_eq!(camera.get_min_distance(), 20.0);
    }

    #[test]
    fn test_interpolation_plan_from_config() {
        assert_eq!(Config::default().interpolation_plan(), InterpolationPlan::default());

        let config = Config {
            camera: Some(CameraConfig {
                epsilon: Some(0.5),
                max_steps: Some(30),
                ..Default::default()
            }),
            ..Default::default()
        };
        let plan = config.interpolation_plan();
        assert_eq!(plan.epsilon, 0.5);
        assert_eq!(plan.max_steps, 30);
        assert_eq!(plan.blend, InterpolationPlan::default().blend);
    }

    #[test]
    fn test_inverted_size_bounds_are_swapped() {
        let config = Config {
            layout: Some(LayoutConfig {
                size_min: Some(2.0),
                size_max: Some(1.0),
                ..Default::default()
            }),
            ..Default::default()
        };
        let placement = config.layout_options(Focus::All).placement;
        assert_eq!((placement.size_min, placement.size_max), (1.0, 2.0));
    }

    #[test]
    fn test_config_with_unknown_view_is_rejected() {
        let json = r#"{"view": "diagonal"}"#;
        assert!(serde_json::from_str::<Config>(json).is_err());
    }
}
