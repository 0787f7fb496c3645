use std::{
    env,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use tracing::{debug, warn};

use crate::error::ConverterError;

#[derive(Clone, Debug)]
pub struct Converter {
    program: String,
    format_args: [&'static str; 2],
}

impl Converter {
    pub fn markdown(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            format_args: ["--to", "html5"],
        }
    }

    pub fn graph(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            format_args: ["-T", "svg"],
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn locate(&self) -> Result<PathBuf, ConverterError> {
        find_program(&self.program).ok_or_else(|| ConverterError::Missing {
            program: self.program.clone(),
        })
    }

    /// Blocks until the program exits; there is no timeout. Failures are
    /// logged, never propagated: a spawn failure yields no bytes, a non-zero
    /// exit yields whatever was printed.
    pub fn render(&self, file: &Path) -> Vec<u8> {
        match self.run(file) {
            Ok(stdout) => stdout,
            Err(err) => {
                warn!("{err:#}");
                Vec::new()
            }
        }
    }

    fn run(&self, file: &Path) -> Result<Vec<u8>, ConverterError> {
        debug!("running {} on {}", self.program, file.display());
        let output = Command::new(&self.program)
            .arg(file)
            .args(self.format_args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| ConverterError::Spawn {
                program: self.program.clone(),
                file: file.to_path_buf(),
                source,
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            warn!(
                "{} exited with {} on {}: {}",
                self.program,
                output.status,
                file.display(),
                stderr.trim()
            );
        } else if !stderr.trim().is_empty() {
            warn!("{} stderr: {}", self.program, stderr.trim());
        }

        Ok(output.stdout)
    }
}

fn find_program(program: &str) -> Option<PathBuf> {
    let literal = Path::new(program);
    if literal.components().count() > 1 {
        return literal.is_file().then(|| literal.to_path_buf());
    }

    let search = env::var_os("PATH").unwrap_or_default();
    env::split_paths(&search)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}
