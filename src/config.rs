//! Loads the project file (`almanac.yaml`) and resolves it, together with any
//! command-line overrides, into a [`Config`].

use crate::feed::{FeedConfig, DEFAULT_DESCRIPTION_CUTOFF, DEFAULT_RECENT};
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use url::Url;

/// The name of the project file searched for by [`Config::from_directory`].
pub const PROJECT_FILE: &str = "almanac.yaml";

/// The author of the site, as credited in feeds.
#[derive(Clone, Debug, Deserialize)]
pub struct Author {
    pub name: String,

    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Deserialize)]
struct Project {
    site: FeedConfig,

    #[serde(default)]
    server: Server,

    #[serde(default)]
    paths: Paths,

    #[serde(default)]
    feed: Feed,
}

#[derive(Deserialize)]
#[serde(default)]
struct Server {
    address: String,
    max_connections: u32,
}

impl Default for Server {
    fn default() -> Self {
        Server {
            address: "0.0.0.0:8080".to_owned(),
            max_connections: 8,
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct Paths {
    root_directory: PathBuf,
    database: PathBuf,
    templates: PathBuf,
    #[serde(rename = "static")]
    static_directory: Option<PathBuf>,
}

impl Default for Paths {
    fn default() -> Self {
        Paths {
            root_directory: PathBuf::new(),
            database: PathBuf::from("db/testDB.db"),
            templates: PathBuf::from("templates"),
            static_directory: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct Feed {
    recent: usize,
    description_cutoff: usize,
}

impl Default for Feed {
    fn default() -> Self {
        Feed {
            recent: DEFAULT_RECENT,
            description_cutoff: DEFAULT_DESCRIPTION_CUTOFF,
        }
    }
}

/// Values given on the command line. Each one that is set replaces the
/// corresponding value from the project file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub root_directory: Option<PathBuf>,
    pub database: Option<PathBuf>,
    pub templates: Option<PathBuf>,
    pub port: Option<u16>,
}

/// Fully resolved configuration. Paths are already joined onto the root
/// directory.
#[derive(Clone, Debug)]
pub struct Config {
    pub feed: FeedConfig,
    pub address: SocketAddr,
    pub max_connections: u32,
    pub database: PathBuf,
    pub templates_directory: PathBuf,
    pub static_directory: Option<PathBuf>,
    pub recent_entries: usize,
    pub description_cutoff: usize,
}

impl Config {
    /// Looks for [`PROJECT_FILE`] in `dir` and then in each of its ancestors,
    /// and loads the first one found.
    pub fn from_directory(dir: &Path, overrides: &Overrides) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            Config::from_project_file(&path, overrides)
                .with_context(|| format!("Loading configuration from `{}`", path.display()))
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent, overrides),
                None => Err(anyhow!(
                    "Could not find `{}` in any parent directory",
                    PROJECT_FILE
                )),
            }
        }
    }

    pub fn from_project_file(path: &Path, overrides: &Overrides) -> Result<Config> {
        let file = File::open(path)
            .with_context(|| format!("Opening project file `{}`", path.display()))?;
        let project: Project = serde_yaml::from_reader(file)?;
        Config::resolve(project, overrides)
    }

    /// Parses a project file's contents. Relative paths stay relative to the
    /// root directory named in `yaml` (or the working directory).
    pub fn from_yaml(yaml: &str, overrides: &Overrides) -> Result<Config> {
        Config::resolve(serde_yaml::from_str(yaml)?, overrides)
    }

    fn resolve(mut project: Project, overrides: &Overrides) -> Result<Config> {
        Url::parse(&project.site.link)
            .with_context(|| format!("Invalid site link `{}`", project.site.link))?;
        // Entry paths start with a slash, so the base must not end with one.
        project.site.link = project.site.link.trim_end_matches('/').to_owned();
        if project.feed.recent == 0 {
            return Err(anyhow!("`feed.recent` must be at least 1"));
        }

        let root = overrides
            .root_directory
            .clone()
            .unwrap_or(project.paths.root_directory);
        let database = overrides
            .database
            .clone()
            .unwrap_or(project.paths.database);
        let templates = overrides
            .templates
            .clone()
            .unwrap_or(project.paths.templates);

        let mut address: SocketAddr = project
            .server
            .address
            .parse()
            .with_context(|| format!("Invalid server address `{}`", project.server.address))?;
        if let Some(port) = overrides.port {
            address.set_port(port);
        }

        Ok(Config {
            feed: project.site,
            address,
            max_connections: project.server.max_connections.max(1),
            database: root.join(database),
            templates_directory: root.join(templates),
            static_directory: project.paths.static_directory.map(|dir| root.join(dir)),
            recent_entries: project.feed.recent,
            description_cutoff: project.feed.description_cutoff,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const MINIMAL: &str = "
site:
  title: A Blog
  link: https://example.org
  created: 1489554739
";

    #[test]
    fn test_defaults() -> Result<()> {
        let config = Config::from_yaml(MINIMAL, &Overrides::default())?;
        assert_eq!("0.0.0.0:8080".parse::<SocketAddr>()?, config.address);
        assert_eq!(PathBuf::from("db/testDB.db"), config.database);
        assert_eq!(PathBuf::from("templates"), config.templates_directory);
        assert_eq!(None, config.static_directory);
        assert_eq!(15, config.recent_entries);
        assert_eq!(50, config.description_cutoff);
        assert!(config.feed.author.is_none());
        Ok(())
    }

    #[test]
    fn test_full_project() -> Result<()> {
        let yaml = "
site:
  title: A Blog
  link: https://example.org
  description: Musings.
  author:
    name: Jo Writer
    email: jo@example.org
  created: 1489554739
server:
  address: 127.0.0.1:9000
paths:
  root_directory: /srv/blog
  database: blog.db
  templates: tmpl
  static: assets
feed:
  recent: 5
  description_cutoff: 20
";
        let config = Config::from_yaml(yaml, &Overrides::default())?;
        assert_eq!("127.0.0.1:9000".parse::<SocketAddr>()?, config.address);
        assert_eq!(PathBuf::from("/srv/blog/blog.db"), config.database);
        assert_eq!(PathBuf::from("/srv/blog/tmpl"), config.templates_directory);
        assert_eq!(Some(PathBuf::from("/srv/blog/assets")), config.static_directory);
        assert_eq!(5, config.recent_entries);
        assert_eq!(20, config.description_cutoff);
        assert_eq!("Jo Writer", config.feed.author.unwrap().name);
        Ok(())
    }

    #[test]
    fn test_site_link_trailing_slash_is_trimmed() -> Result<()> {
        let yaml = MINIMAL.replace("https://example.org", "https://example.org/blog//");
        let config = Config::from_yaml(&yaml, &Overrides::default())?;
        assert_eq!("https://example.org/blog", config.feed.link);

        let feed = crate::feed::Feed::new(&config.feed, &[entry()], 50).unwrap();
        assert_eq!("https://example.org/blog/entry/1000", feed.items[0].link);
        Ok(())
    }

    fn entry() -> crate::entry::Entry {
        crate::entry::Entry {
            id: 1000,
            title: "t".to_owned(),
            next: None,
            previous: None,
            content: String::new(),
            image: String::new(),
        }
    }

    #[test]
    fn test_overrides() -> Result<()> {
        let overrides = Overrides {
            root_directory: Some(PathBuf::from("/web")),
            database: Some(PathBuf::from("other.db")),
            templates: None,
            port: Some(3000),
        };
        let config = Config::from_yaml(MINIMAL, &overrides)?;
        assert_eq!(3000, config.address.port());
        assert_eq!(PathBuf::from("/web/other.db"), config.database);
        assert_eq!(PathBuf::from("/web/templates"), config.templates_directory);
        Ok(())
    }

    #[test]
    fn test_invalid_link() {
        let yaml = MINIMAL.replace("https://example.org", "not a url");
        assert!(Config::from_yaml(&yaml, &Overrides::default()).is_err());
    }

    #[test]
    fn test_missing_site() {
        assert!(Config::from_yaml("server:\n  address: 0.0.0.0:80\n", &Overrides::default()).is_err());
    }
}
