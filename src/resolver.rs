use ast::tree::Tree;
use error::Result;

use std::fs;
use std::path::{Path, PathBuf};

pub const URI_FILE_SCHEME: &'static str = "file:";

/// A located stylesheet.
#[derive(Clone, Debug, PartialEq)]
pub struct Source {
    pub path: PathBuf,
    pub contents: String,
}

/// Finds the stylesheet an `@import` identifier refers to.
pub trait Resolver {
    fn resolve(&mut self, identifier: &str) -> Option<Source>;
}

/// Supplies the parsed tree of an imported stylesheet. `Ok(None)` means the
/// import could not be found.
pub trait ImportLoader {
    fn load(&mut self, uri: &str) -> Result<Option<Tree>>;
}

/// Reads the identifier as a path, adding `.scss` when needed.
#[derive(Debug, Default)]
pub struct FilesystemResolver;

impl Resolver for FilesystemResolver {
    fn resolve(&mut self, identifier: &str) -> Option<Source> {
        let mut candidates = vec![PathBuf::from(identifier)];
        if !identifier.ends_with(".scss") {
            candidates.push(PathBuf::from(format!("{}.scss", identifier)));
        }
        candidates.into_iter()
            .filter(|p| p.is_file())
            .filter_map(|p| match fs::read_to_string(&p) {
                Ok(contents) => Some(Source { path: p, contents: contents }),
                Err(e) => {
                    warn!("could not read {}: {}", p.display(), e);
                    None
                },
            })
            .next()
    }
}

/// Strips a `file:` scheme; when the scheme is repeated everything up to
/// its last occurrence goes.
pub fn remove_uri_scheme(identifier: &str) -> &str {
    if identifier.starts_with(URI_FILE_SCHEME) {
        match identifier.rfind(URI_FILE_SCHEME) {
            Some(i) => &identifier[i + URI_FILE_SCHEME.len()..],
            None => identifier,
        }
    } else {
        identifier
    }
}

/// `dir/name` becomes `dir/_name.scss`.
pub fn partials_path(identifier: &str) -> String {
    let mut path = match identifier.rfind('/') {
        Some(i) => format!("{}_{}", &identifier[..i + 1], &identifier[i + 1..]),
        None => format!("_{}", identifier),
    };
    if !path.ends_with(".scss") {
        path.push_str(".scss");
    }
    path
}

/// Sass partials: `@import "compass"` also finds `_compass.scss`.
#[derive(Debug, Default)]
pub struct PartialsResolver {
    filesystem: FilesystemResolver,
}

impl PartialsResolver {
    pub fn new() -> PartialsResolver {
        PartialsResolver::default()
    }
}

impl Resolver for PartialsResolver {
    fn resolve(&mut self, identifier: &str) -> Option<Source> {
        let path = remove_uri_scheme(identifier);
        debug!("resolving {}", path);
        self.filesystem.resolve(path)
            .or_else(|| self.filesystem.resolve(&partials_path(path)))
    }
}

/// Tries the identifier as given, then under each of a list of directories,
/// with partials semantics. The directory of every located file joins the
/// list, so that relative imports inside it resolve.
#[derive(Debug, Default)]
pub struct ImportPathResolver {
    paths: Vec<PathBuf>,
    partials: PartialsResolver,
}

impl ImportPathResolver {
    pub fn new<P: Into<PathBuf>>(paths: Vec<P>) -> ImportPathResolver {
        ImportPathResolver {
            paths: paths.into_iter().map(|p| p.into()).collect(),
            partials: PartialsResolver::new(),
        }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn add_path<P: Into<PathBuf>>(&mut self, path: P) {
        let path = path.into();
        if !self.paths.contains(&path) {
            self.paths.push(path);
        }
    }

    pub fn remove_path(&mut self, path: &Path) {
        self.paths.retain(|p| p != path);
    }

    pub fn set_paths(&mut self, paths: Vec<PathBuf>) {
        self.paths = paths;
    }
}

impl Resolver for ImportPathResolver {
    fn resolve(&mut self, identifier: &str) -> Option<Source> {
        let stripped = remove_uri_scheme(identifier);
        let mut found = self.partials.resolve(stripped);
        if found.is_none() && !Path::new(stripped).is_absolute() {
            for dir in self.paths.clone() {
                let candidate = dir.join(stripped);
                if let Some(source) = self.partials.resolve(&candidate.to_string_lossy()) {
                    found = Some(source);
                    break;
                }
            }
        }
        if let Some(ref source) = found {
            if let Some(dir) = source.path.parent() {
                debug!("adding import path {}", dir.display());
                self.add_path(dir.to_path_buf());
            }
        }
        found
    }
}

/// Combines a resolver with a parser for the located text.
pub struct ResolvingLoader<R, F> {
    resolver: R,
    parse: F,
}

impl<R, F> ResolvingLoader<R, F>
    where R: Resolver, F: FnMut(&Source) -> Result<Tree>
{
    pub fn new(resolver: R, parse: F) -> ResolvingLoader<R, F> {
        ResolvingLoader { resolver: resolver, parse: parse }
    }
}

impl<R, F> ImportLoader for ResolvingLoader<R, F>
    where R: Resolver, F: FnMut(&Source) -> Result<Tree>
{
    fn load(&mut self, uri: &str) -> Result<Option<Tree>> {
        match self.resolver.resolve(uri) {
            Some(source) => {
                debug!("importing {}", source.path.display());
                Ok(Some((self.parse)(&source)?))
            },
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ast::tree::Tree;
    use std::env;
    use std::fs;
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("scss-eval-{}-{}", name, ::std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn it_removes_the_file_scheme() {
        assert_eq!("/a/b.scss", remove_uri_scheme("file:/a/b.scss"));
        assert_eq!("/a/b.scss", remove_uri_scheme("file:file:/a/b.scss"));
        assert_eq!("b.scss", remove_uri_scheme("b.scss"));
    }

    #[test]
    fn it_builds_partials_paths() {
        assert_eq!("_compass.scss", partials_path("compass"));
        assert_eq!("lib/_grid.scss", partials_path("lib/grid.scss"));
    }

    #[test]
    fn it_finds_partials() {
        let dir = scratch_dir("partials");
        fs::write(dir.join("_colors.scss"), "$red: #f00;").unwrap();

        let identifier = format!("file:{}", dir.join("colors").display());
        let source = PartialsResolver::new().resolve(&identifier).unwrap();
        assert_eq!(dir.join("_colors.scss"), source.path);
        assert_eq!("$red: #f00;", source.contents);

        assert_eq!(None, PartialsResolver::new().resolve(&dir.join("missing").to_string_lossy()));
    }

    #[test]
    fn it_searches_import_paths_and_remembers_directories() {
        let dir = scratch_dir("import-paths");
        let nested = dir.join("lib");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("grid.scss"), ".grid {}").unwrap();

        let mut resolver = ImportPathResolver::new(vec![dir.clone()]);
        let source = resolver.resolve("lib/grid").unwrap();
        assert_eq!(nested.join("grid.scss"), source.path);
        assert!(resolver.paths().contains(&nested));

        resolver.remove_path(&nested);
        assert_eq!(&[dir.clone()], resolver.paths());
    }

    #[test]
    fn it_keeps_trying_the_working_directory_first() {
        let base = PathBuf::from("target").join(format!("scss-eval-cwd-{}", ::std::process::id()));
        fs::create_dir_all(base.join("a")).unwrap();
        fs::create_dir_all(base.join("c")).unwrap();
        fs::write(base.join("a").join("b.scss"), "").unwrap();
        fs::write(base.join("c").join("d.scss"), "").unwrap();

        let mut resolver = ImportPathResolver::new(Vec::<PathBuf>::new());
        let first = resolver.resolve(&base.join("a").join("b").to_string_lossy()).unwrap();
        assert_eq!(base.join("a").join("b.scss"), first.path);
        assert!(!resolver.paths().is_empty());

        let second = resolver.resolve(&base.join("c").join("d").to_string_lossy()).unwrap();
        assert_eq!(base.join("c").join("d.scss"), second.path);
    }

    #[test]
    fn it_loads_through_a_parser() {
        let dir = scratch_dir("loader");
        fs::write(dir.join("base.scss"), "").unwrap();

        let mut loader = ResolvingLoader::new(ImportPathResolver::new(vec![dir]), |_: &Source| Ok(Tree::new()));
        assert!(loader.load("base").unwrap().is_some());
        assert!(loader.load("nothing-here").unwrap().is_none());
    }
}
