/*
 *  config.rs
 *
 *  ssd1325 - grayscale OLED driver
 *  (c) 2020-26 Stuart Hunter
 *
 *  Board configuration: defaults, YAML file and CLI overrides
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

use crate::display::command::{Product, MAX_CONTRAST};
use crate::display::framebuffer::{MAX_DIMENSION, MIN_DIMENSION};

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Default)]
pub struct Config {
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    /// panel geometry, wiring & behavior
    pub display: Option<DisplayConfig>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Default)]
pub struct DisplayConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub product: Option<Product>,
    pub contrast: Option<u8>,       // 0-127
    pub invert: Option<bool>,
    pub bus: Option<BusConfig>,     // <- parallel, spi or i2c wiring
}

/// How the controller is wired to the host
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BusConfig {
    /// 8080 parallel bus, BCM numbering
    Parallel {
        data_pins: [u32; 8],        // D0..D7
        rd_pin: u32,
        wr_pin: u32,
        cs_pin: u32,
        dc_pin: u32,
        rst_pin: u32,
    },
    Spi {
        bus: String,                // e.g. "/dev/spidev0.0"
        speed_hz: Option<u32>,
        dc_pin: u32,
        rst_pin: Option<u32>,
    },
    I2c {
        bus: String,                // e.g. "/dev/i2c-1"
        address: u8,
    },
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "ssd1325", about = "SSD1325 grayscale OLED demo", disable_help_flag = false)]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    #[arg(long)]
    pub display_width: Option<u32>,
    #[arg(long)]
    pub display_height: Option<u32>,
    #[arg(long)]
    pub display_contrast: Option<u8>,
    #[arg(long, action = ArgAction::Set)]
    pub display_invert: Option<bool>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Public entry point: parse CLI, read YAML, merge, validate.
pub fn load() -> Result<Config, ConfigError> {
    let cli = Cli::parse();
    let cfg = load_with(&cli)?;

    if cli.dump_config {
        // Pretty YAML of effective config (nice for debugging)
        let s = serde_yaml::to_string(&cfg)?;
        println!("{s}");
        std::process::exit(0);
    }

    Ok(cfg)
}

/// Layer defaults, YAML and `cli` without touching the process arguments
pub fn load_with(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    validate(&cfg)?;

    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/ssd1325/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/ssd1325/config.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["ssd1325.yaml", "config.yaml", "config/ssd1325.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    parse_yaml(&s)
}

/// Parse a YAML document into a [`Config`]
pub fn parse_yaml(s: &str) -> Result<Config, ConfigError> {
    let cfg: Config = serde_yaml::from_str(s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    if src.log_level.is_some() { dst.log_level = src.log_level; }
    match (&mut dst.display, src.display) {
        (None, Some(c)) => dst.display = Some(c),
        (Some(d), Some(s)) => merge_display(d, s),
        _ => {}
    }
}

fn merge_display(dst: &mut DisplayConfig, src: DisplayConfig) {
    if src.width.is_some()     { dst.width = src.width; }
    if src.height.is_some()    { dst.height = src.height; }
    if src.product.is_some()   { dst.product = src.product; }
    if src.contrast.is_some()  { dst.contrast = src.contrast; }
    if src.invert.is_some()    { dst.invert = src.invert; }
    if src.bus.is_some()       { dst.bus = src.bus; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some() { cfg.log_level = cli.log_level.clone(); }
    let any_display = cli.display_width.is_some()
        || cli.display_height.is_some()
        || cli.display_contrast.is_some()
        || cli.display_invert.is_some();

    if any_display && cfg.display.is_none() {
        cfg.display = Some(DisplayConfig::default());
    }
    if let Some(display) = cfg.display.as_mut() {
        if cli.display_width.is_some()    { display.width = cli.display_width; }
        if cli.display_height.is_some()   { display.height = cli.display_height; }
        if cli.display_contrast.is_some() { display.contrast = cli.display_contrast; }
        if cli.display_invert.is_some()   { display.invert = cli.display_invert; }
    }
}

/// Put any invariants here (required fields, ranges, etc.)
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(display) = cfg.display.as_ref() {
        for (name, value) in [("width", display.width), ("height", display.height)] {
            if let Some(v) = value {
                if !(MIN_DIMENSION..=MAX_DIMENSION).contains(&v) {
                    return Err(ConfigError::Validation(format!(
                        "display {} must be {}..={}",
                        name, MIN_DIMENSION, MAX_DIMENSION
                    )));
                }
            }
        }
        if let Some(w) = display.width {
            if w % 2 != 0 {
                return Err(ConfigError::Validation("display width must be even".into()));
            }
        }
        if let Some(c) = display.contrast {
            if c > MAX_CONTRAST {
                return Err(ConfigError::Validation(format!(
                    "display contrast must be 0..={}",
                    MAX_CONTRAST
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARALLEL: &str = r#"
log_level: debug
display:
  width: 128
  height: 64
  product: rex012864f
  contrast: 64
  bus:
    type: parallel
    data_pins: [5, 6, 12, 13, 16, 19, 20, 21]
    rd_pin: 22
    wr_pin: 23
    cs_pin: 24
    dc_pin: 25
    rst_pin: 26
"#;

    #[test]
    fn test_parse_parallel_bus() {
        let cfg = parse_yaml(PARALLEL).unwrap();
        let display = cfg.display.unwrap();
        assert_eq!(display.product, Some(Product::Rex012864f));
        match display.bus {
            Some(BusConfig::Parallel { data_pins, rst_pin, .. }) => {
                assert_eq!(data_pins[7], 21);
                assert_eq!(rst_pin, 26);
            }
            other => panic!("unexpected bus {:?}", other),
        }
    }

    #[test]
    fn test_unknown_product_rejected() {
        let yaml = "display:\n  product: nhd27\n";
        assert!(matches!(parse_yaml(yaml), Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_cli_overrides_yaml() {
        let mut cfg = parse_yaml(PARALLEL).unwrap();
        let cli = Cli {
            display_contrast: Some(0x10),
            display_invert: Some(true),
            log_level: Some("trace".into()),
            ..Default::default()
        };
        apply_cli_overrides(&mut cfg, &cli);

        let display = cfg.display.as_ref().unwrap();
        assert_eq!(display.contrast, Some(0x10));
        assert_eq!(display.invert, Some(true));
        assert_eq!(display.width, Some(128));
        assert_eq!(cfg.log_level.as_deref(), Some("trace"));
    }

    #[test]
    fn test_merge_keeps_unset_fields() {
        let mut dst = parse_yaml(PARALLEL).unwrap();
        let src = parse_yaml("display:\n  height: 80\n").unwrap();
        merge(&mut dst, src);

        let display = dst.display.unwrap();
        assert_eq!(display.height, Some(80));
        assert_eq!(display.width, Some(128));
        assert!(display.bus.is_some());
    }

    #[test]
    fn test_validate_ranges() {
        let mut cfg = parse_yaml(PARALLEL).unwrap();
        assert!(validate(&cfg).is_ok());

        cfg.display.as_mut().unwrap().width = Some(127);
        assert!(validate(&cfg).is_err());

        cfg.display.as_mut().unwrap().width = Some(256);
        assert!(validate(&cfg).is_err());

        cfg.display.as_mut().unwrap().width = Some(128);
        cfg.display.as_mut().unwrap().contrast = Some(0x80);
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn test_missing_explicit_file() {
        let cli = Cli {
            config: Some(PathBuf::from("/nonexistent/ssd1325.yaml")),
            ..Default::default()
        };
        assert!(matches!(load_with(&cli), Err(ConfigError::Validation(_))));
    }
}
