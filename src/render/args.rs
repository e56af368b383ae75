use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::Command,
};

use crate::{
    foundation::{
        config::{PipelineConfig, RenderConfig},
        error::PipelineResult,
    },
    naming::{ids::in_filename, layout},
    queue::store::write_atomic,
};

/// Which batch renderer a scene goes through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Renderer {
    /// Maya's `Render` executable with the Arnold renderer.
    Arnold,
    /// `mayabatch` running the flair render script.
    FlairBatch,
}

impl Renderer {
    /// Arnold when the scene stem mentions `arnold_token`, flair otherwise.
    pub fn for_scene(scene: &Path, arnold_token: &str) -> Self {
        if in_filename(arnold_token, scene) {
            Self::Arnold
        } else {
            Self::FlairBatch
        }
    }

    /// Executable name inside the Maya bin directory.
    pub fn executable(self) -> &'static str {
        match self {
            Self::Arnold => "Render",
            Self::FlairBatch => "mayabatch",
        }
    }
}

/// Fully resolved command line for rendering one scene.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderRequest {
    renderer: Renderer,
    program: PathBuf,
    args: Vec<OsString>,
}

impl RenderRequest {
    /// Build the command line for `scene` using `project` as the Maya project.
    pub fn for_scene(scene: &Path, render: &RenderConfig, project: &Path) -> PipelineResult<Self> {
        let renderer = Renderer::for_scene(scene, &render.arnold_token);
        let program = render.maya_bin_dir()?.join(renderer.executable());

        let project = OsString::from(project.to_string_lossy().replace('\\', "/"));
        let scene = scene.as_os_str().to_os_string();
        let args: Vec<OsString> = match renderer {
            Renderer::Arnold => vec![
                "-renderer".into(),
                "arnold".into(),
                "-proj".into(),
                project,
                "-ai:threads".into(),
                "-1".into(),
                "-ai:aerr".into(),
                "true".into(),
                "-ai:alf".into(),
                "true".into(),
                scene,
            ],
            Renderer::FlairBatch => vec![
                "-file".into(),
                scene,
                "-proj".into(),
                project,
                "-command".into(),
                format!("python(\"{}\")", render.batch_command).into(),
                "-noAutoloadPlugins".into(),
            ],
        };

        Ok(Self {
            renderer,
            program,
            args,
        })
    }

    /// Selected renderer.
    pub fn renderer(&self) -> Renderer {
        self.renderer
    }

    /// Executable to run.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments after the executable.
    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Process builder for this request.
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }

    /// The whole command on one line with every word double-quoted, for cmd or zsh.
    pub fn shell_line(&self) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .map(|word| quote(&word.to_string_lossy()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Write [`RenderRequest::shell_line`] to the args script the shell loop runs.
    pub fn write_args_file(&self, path: &Path) -> PipelineResult<()> {
        let line = format!("{}\n", self.shell_line());
        write_atomic(path, line.as_bytes(), "write render args")
    }
}

/// Maya project for renders: configured, else the shared drive.
pub fn project_dir(cfg: &PipelineConfig) -> PipelineResult<PathBuf> {
    if let Some(dir) = &cfg.render.project_dir {
        return Ok(dir.clone());
    }
    if let Some(drive) = &cfg.shared_drive {
        return Ok(drive.clone());
    }
    layout::find_shared_drive(layout::POST_PRODUCTION_DRIVE)
}

fn quote(word: &str) -> String {
    format!("\"{}\"", word.replace('"', "\\\""))
}

#[cfg(test)]
#[path = "../../tests/unit/render/args.rs"]
mod tests;
