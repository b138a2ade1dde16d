pub mod animation;
pub mod base;
pub mod config;
pub mod error;
pub mod plotters_ext;
pub mod scene;

pub use crate::error::{Error, Result};

pub mod prelude {
    pub use crate::animation::*;
    pub use crate::base::*;
    pub use crate::config::*;
    pub use crate::error::{Error, Result};
    pub use crate::plotters_ext::*;
    pub use crate::scene::*;
}

use tracing::info;

use crate::animation::{save_gif, show};
use crate::base::{Layout, TrajectoryTable};
use crate::config::Config;
use crate::scene::Animator;

/// Loads the trajectories, then saves and/or displays the animation.
pub fn run(config: &Config, save: bool) -> Result<()> {
    info!("reading data...");
    let table = TrajectoryTable::from_csv(&config.input)?;
    let layout = Layout::from_table(&table)?;
    info!(
        agents = layout.agents.len(),
        targets = layout.targets.len(),
        frames = layout.num_frames,
        "plotting..."
    );

    let mut animator = Animator::new(layout);

    if save {
        info!("saving...this may take a while");
        save_gif(&mut animator, &config.output, config.fps, config.size())?;
    }

    if config.display {
        show(&mut animator, config.interval(), config.size())?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headless(dir: &std::path::Path) -> Config {
        let input = dir.join("results.csv");
        std::fs::write(
            &input,
            "time,Agent0,Agent0,Agent0,Target0,Target0,Target0\n\
             0.0,0,0,0,5,5,5\n\
             0.5,1,1,1,5,5,5\n",
        )
        .unwrap();

        Config {
            input,
            output: dir.join("trajectory_animation.gif"),
            display: false,
            ..Config::default()
        }
    }

    #[test]
    fn test_run_save() {
        let dir = tempfile::tempdir().unwrap();
        let config = headless(dir.path());

        run(&config, true).unwrap();
        assert!(std::fs::metadata(&config.output).unwrap().len() > 0);
    }

    #[test]
    fn test_run_without_save() {
        let dir = tempfile::tempdir().unwrap();
        let config = headless(dir.path());

        run(&config, false).unwrap();
        assert!(!config.output.exists());
    }

    #[test]
    fn test_run_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            input: dir.path().join("missing.csv"),
            display: false,
            ..Config::default()
        };
        assert!(run(&config, true).is_err());
    }
}
