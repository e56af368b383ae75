use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    foundation::config::RenderConfig, queue::session::Processor, render::args::RenderRequest,
};

/// Runs the batch renderer for each scene and waits for it to exit.
#[derive(Clone, Debug)]
pub struct CommandProcessor {
    render: RenderConfig,
    project: PathBuf,
}

impl CommandProcessor {
    /// Processor rendering into `project` with the executables from `render`.
    pub fn new(render: RenderConfig, project: impl Into<PathBuf>) -> Self {
        Self {
            render,
            project: project.into(),
        }
    }
}

impl Processor for CommandProcessor {
    fn process(&mut self, scene: &Path) -> anyhow::Result<()> {
        let request = RenderRequest::for_scene(scene, &self.render, &self.project)?;
        tracing::info!(
            renderer = ?request.renderer(),
            command = %request.shell_line(),
            "starting render"
        );

        let status = request
            .to_command()
            .status()
            .with_context(|| format!("failed to start '{}'", request.program().display()))?;
        if !status.success() {
            anyhow::bail!("{} exited with {status}", request.renderer().executable());
        }
        Ok(())
    }
}

/// Logs the command each scene would run without starting it.
#[derive(Clone, Debug)]
pub struct DryRunProcessor {
    render: RenderConfig,
    project: PathBuf,
    planned: Vec<String>,
}

impl DryRunProcessor {
    /// Dry run with the same settings a [`CommandProcessor`] would use.
    pub fn new(render: RenderConfig, project: impl Into<PathBuf>) -> Self {
        Self {
            render,
            project: project.into(),
            planned: Vec::new(),
        }
    }

    /// Command lines seen so far.
    pub fn planned(&self) -> &[String] {
        &self.planned
    }
}

impl Processor for DryRunProcessor {
    fn process(&mut self, scene: &Path) -> anyhow::Result<()> {
        let request = RenderRequest::for_scene(scene, &self.render, &self.project)?;
        let line = request.shell_line();
        tracing::info!(command = %line, "dry run");
        self.planned.push(line);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/runner.rs"]
mod tests;
