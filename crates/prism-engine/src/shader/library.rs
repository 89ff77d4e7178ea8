use std::borrow::Cow;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::Error;

/// Named shader sources: an override directory first, then bundled text.
///
/// Passed explicitly to whoever loads programs; there is no global lookup.
#[derive(Debug, Clone, Default)]
pub struct ShaderLibrary {
    bundled: HashMap<&'static str, &'static str>,
    dir: Option<PathBuf>,
}

impl ShaderLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers source text compiled into the binary.
    pub fn with_bundled(mut self, name: &'static str, source: &'static str) -> Self {
        self.bundled.insert(name, source);
        self
    }

    /// Files in `dir` shadow bundled sources of the same name.
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    pub fn dir(&self) -> Option<&std::path::Path> {
        self.dir.as_deref()
    }

    pub fn load_text(&self, name: &str) -> Result<Cow<'static, str>, Error> {
        if let Some(dir) = self.dir.as_ref() {
            let path = dir.join(name);
            if path.is_file() {
                let text = std::fs::read_to_string(&path).map_err(|e| {
                    Error::ResourceNotFound(format!("{name} ({}: {e})", path.display()))
                })?;
                log::debug!("shader `{name}` loaded from {}", path.display());
                return Ok(Cow::Owned(text));
            }
        }

        match self.bundled.get(name) {
            Some(source) => Ok(Cow::Borrowed(source)),
            None => Err(Error::ResourceNotFound(name.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("prism-shaders-{tag}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn bundled_source_is_found() {
        let lib = ShaderLibrary::new().with_bundled("a.wgsl", "// a");
        assert_eq!(lib.load_text("a.wgsl").unwrap(), "// a");
    }

    #[test]
    fn missing_name_reports_it() {
        let lib = ShaderLibrary::new();
        match lib.load_text("nope.wgsl") {
            Err(Error::ResourceNotFound(name)) => assert_eq!(name, "nope.wgsl"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn directory_overrides_bundle() {
        let dir = scratch_dir("override");
        std::fs::write(dir.join("a.wgsl"), "// from disk").unwrap();

        let lib = ShaderLibrary::new()
            .with_bundled("a.wgsl", "// bundled")
            .with_bundled("b.wgsl", "// b")
            .with_dir(&dir);

        assert_eq!(lib.load_text("a.wgsl").unwrap(), "// from disk");
        // falls back to the bundle when the file is absent
        assert_eq!(lib.load_text("b.wgsl").unwrap(), "// b");

        std::fs::remove_dir_all(&dir).ok();
    }
}
