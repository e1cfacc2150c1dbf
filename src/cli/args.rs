//! Command-line arguments.
//!
//! Path overrides can be given as flags (`--music ./audio`) or in the
//! `key=value` form (`music=audio`). Flags win over `key=value` pairs, which
//! win over the config file.

use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;

/// Music Pages: build a static HTML site from tagged audio files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Alternate template directory (default: bundled templates)
    #[arg(short, long, env = "MUSIC_PAGES_TEMPLATES")]
    pub templates: Option<PathBuf>,

    /// Output root directory (default: current directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Music directory to scan (default: ./music)
    #[arg(short, long)]
    pub music: Option<PathBuf>,

    /// Also write the index page into this directory
    #[arg(long)]
    pub copy_index: Option<PathBuf>,

    /// Config file (default: <config dir>/music-pages/config.toml)
    #[arg(short, long, env = "MUSIC_PAGES_CONFIG")]
    pub config: Option<PathBuf>,

    /// Overrides in key=value form: templates=, output=, music=, copyindex=
    #[arg(value_parser = parse_override, value_name = "KEY=VALUE")]
    pub overrides: Vec<Override>,
}

/// One `key=value` path override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Override {
    Templates(PathBuf),
    Output(PathBuf),
    Music(PathBuf),
    CopyIndex(PathBuf),
}

fn parse_override(arg: &str) -> Result<Override, String> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{arg}`"))?;
    if value.is_empty() {
        return Err(format!("empty value for `{key}`"));
    }
    let path = PathBuf::from(value);
    match key {
        "templates" => Ok(Override::Templates(path)),
        "output" => Ok(Override::Output(path)),
        "music" => Ok(Override::Music(path)),
        "copyindex" | "copy_index" | "copy-index" => Ok(Override::CopyIndex(path)),
        other => Err(format!(
            "unknown key `{other}` (expected templates, output, music or copyindex)"
        )),
    }
}

impl Cli {
    /// Apply path overrides on top of a loaded config.
    pub fn apply(&self, config: &mut Config) {
        for o in &self.overrides {
            match o {
                Override::Templates(p) => config.paths.templates = Some(p.clone()),
                Override::Output(p) => config.paths.output = p.clone(),
                Override::Music(p) => config.paths.music = p.clone(),
                Override::CopyIndex(p) => config.paths.copy_index = Some(p.clone()),
            }
        }
        if let Some(p) = &self.templates {
            config.paths.templates = Some(p.clone());
        }
        if let Some(p) = &self.output {
            config.paths.output = p.clone();
        }
        if let Some(p) = &self.music {
            config.paths.music = p.clone();
        }
        if let Some(p) = &self.copy_index {
            config.paths.copy_index = Some(p.clone());
        }
    }
}
