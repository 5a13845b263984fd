// src/config.rs

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use crate::encoding::OutsideWindowPolicy;
use crate::table::{parse_species, Granularity};
use crate::viewer::{AxisColors, ViewerSettings};

// --- Main Config Struct ---

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
  /// Structure file loaded at startup
  pub extended_xyz_file: Option<String>,
  pub mode: Granularity,
  /// "all" or a comma-separated list such as "Si,O"; atom mode only
  pub consider_species: String,
  pub title: String,

  pub height_viewer: u32,
  pub width_viewer: u32,
  pub height_graph: u32,

  pub soap_cutoff_radius: f64,
  pub marker_radius: f64,
  pub axis_colors: AxisColors,
  pub outside_window: OutsideWindowPolicy,
  pub cell_edge_color: String,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      extended_xyz_file: None,
      mode: Granularity::Structure,
      consider_species: "all".to_string(),
      title: "Example".to_string(),
      height_viewer: 500,
      width_viewer: 500,
      height_graph: 600,
      soap_cutoff_radius: 4.5,
      marker_radius: 1.0,
      axis_colors: AxisColors::AbcBlueRedGreen,
      outside_window: OutsideWindowPolicy::Clamp,
      cell_edge_color: "#808080".to_string(),
    }
  }
}

impl Config {
  /// Loads config from `path`, or from the standard OS location
  /// (e.g., ~/.config/projview/settings.json). Never fails: problems fall
  /// back to defaults and are described in the returned message.
  pub fn load(path: Option<&Path>) -> (Self, String) {
    let path = path.map(Path::to_path_buf).unwrap_or_else(Self::get_path);
    if path.exists() {
      match File::open(&path) {
        Ok(file) => {
          let reader = BufReader::new(file);
          match serde_json::from_reader(reader) {
            Ok(cfg) => (cfg, format!("Config loaded from {:?}", path)),
            Err(e) => (Self::default(), format!("Error parsing config: {}", e)),
          }
        }
        Err(e) => (Self::default(), format!("Error opening config: {}", e)),
      }
    } else {
      (
        Self::default(),
        "No config found. Using defaults.".to_string(),
      )
    }
  }

  /// Saves config to `path` or the standard OS location
  pub fn save(&self, path: Option<&Path>) -> String {
    let path = path.map(Path::to_path_buf).unwrap_or_else(Self::get_path);
    if let Some(parent) = path.parent() {
      let _ = fs::create_dir_all(parent);
    }

    match File::create(&path) {
      Ok(file) => {
        let writer = BufWriter::new(file);
        match serde_json::to_writer_pretty(writer, self) {
          Ok(_) => format!("Config saved to {:?}", path),
          Err(e) => format!("Failed to save config: {}", e),
        }
      }
      Err(e) => format!("Could not create config file: {}", e),
    }
  }

  pub fn species(&self) -> Vec<String> {
    parse_species(&self.consider_species)
  }

  pub fn viewer_settings(&self) -> ViewerSettings {
    ViewerSettings {
      soap_cutoff_radius: self.soap_cutoff_radius,
      marker_radius: self.marker_radius,
      axis_colors: self.axis_colors,
      cell_edge_color: self.cell_edge_color.clone(),
      width: self.width_viewer,
      height: self.height_viewer,
    }
  }

  fn get_path() -> PathBuf {
    if let Some(proj) = ProjectDirs::from("org", "projview", "projview") {
      proj.config_dir().join("settings.json")
    } else {
      PathBuf::from("settings.json")
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_partial_file_keeps_defaults() {
    let path = std::env::temp_dir().join("projview_config_partial.json");
    fs::write(
      &path,
      r#"{"mode": "atomic", "soap_cutoff_radius": 6.0, "axis_colors": "abc_red_green_blue"}"#,
    )
    .unwrap();

    let (cfg, msg) = Config::load(Some(&path));
    assert!(msg.starts_with("Config loaded"));
    assert_eq!(cfg.mode, Granularity::Atom);
    assert_eq!(cfg.soap_cutoff_radius, 6.0);
    assert_eq!(cfg.axis_colors, AxisColors::AbcRedGreenBlue);
    assert_eq!(cfg.title, "Example");
    assert_eq!(cfg.height_graph, 600);
    assert_eq!(cfg.marker_radius, 1.0);
    assert!(cfg.species().is_empty());

    let _ = fs::remove_file(&path);
  }

  #[test]
  fn test_viewer_settings_carry_panel_size() {
    let cfg: Config = serde_json::from_str(r#"{"width_viewer": 640, "height_viewer": 480}"#).unwrap();
    let settings = cfg.viewer_settings();
    assert_eq!((settings.width, settings.height), (640, 480));
  }

  #[test]
  fn test_consider_species() {
    let cfg: Config = serde_json::from_str(r#"{"consider_species": "Si,O"}"#).unwrap();
    assert_eq!(cfg.species(), vec!["Si".to_string(), "O".to_string()]);
  }

  #[test]
  fn test_missing_and_invalid_files() {
    let missing = std::env::temp_dir().join("projview_config_does_not_exist.json");
    let (cfg, msg) = Config::load(Some(&missing));
    assert_eq!(cfg, Config::default());
    assert!(msg.contains("defaults"));

    let bad = std::env::temp_dir().join("projview_config_bad.json");
    fs::write(&bad, "{ not json").unwrap();
    let (cfg, msg) = Config::load(Some(&bad));
    assert_eq!(cfg, Config::default());
    assert!(msg.starts_with("Error parsing config"));
    let _ = fs::remove_file(&bad);
  }

  #[test]
  fn test_save_then_load() {
    let path = std::env::temp_dir().join("projview_config_saved.json");
    let cfg = Config {
      title: "Silica".to_string(),
      outside_window: OutsideWindowPolicy::Hide,
      ..Config::default()
    };
    assert!(cfg.save(Some(&path)).starts_with("Config saved"));
    let (back, _) = Config::load(Some(&path));
    assert_eq!(back, cfg);
    let _ = fs::remove_file(&path);
  }
}
