use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use r4x_core::strutil::read_conf_file;
use r4x_core::{Digest, ReplyEncoder};
use r4x_http::{CommandTemplate, Location, LocationError, Routes};
use r4x_redis::Endpoint;
use tracing::{debug, info};

use crate::config::{Config, LocationConfig, ServerConfig};
use crate::error::ConfigError;

/// A compiled server block.
#[derive(Debug)]
pub struct Server {
    /// Address to listen on.
    pub listen: SocketAddr,
    /// Redis endpoint commands go to.
    pub endpoint: Endpoint,
    /// Compiled locations.
    pub routes: Routes,
}

/// A compiled configuration, ready to serve.
#[derive(Debug)]
pub struct Gateway {
    /// Encoder shared by every server.
    pub encoder: ReplyEncoder,
    /// Server blocks, in configuration order.
    pub servers: Vec<Server>,
}

impl Config {
    /// Compiles every server block.
    ///
    /// Fails on the first invalid block: a bad listen address, a location
    /// without a command, a template that does not compile or a script that
    /// cannot be read.
    pub fn compile(&self) -> Result<Gateway, ConfigError> {
        if self.servers.is_empty() {
            return Err(ConfigError::NoServers);
        }
        let servers = self
            .servers
            .iter()
            .map(|server| compile_server(server, &self.base_dir))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Gateway {
            encoder: ReplyEncoder::new(self.body_length.into()),
            servers,
        })
    }
}

fn compile_server(server: &ServerConfig, base_dir: &Path) -> Result<Server, ConfigError> {
    let listen = server
        .listen
        .parse()
        .map_err(|source| ConfigError::InvalidListen {
            listen: server.listen.clone(),
            source,
        })?;
    let locations = server
        .locations
        .iter()
        .map(|location| compile_location(location, base_dir))
        .collect::<Result<Vec<_>, _>>()?;
    let endpoint = Endpoint::new(server.redis.host.clone(), server.redis.port);
    info!(%listen, %endpoint, locations = locations.len(), "Server compiled");

    Ok(Server {
        listen,
        endpoint,
        routes: Routes::new(locations),
    })
}

fn compile_location(location: &LocationConfig, base_dir: &Path) -> Result<Location, ConfigError> {
    if location.command.is_empty() {
        return Err(LocationError::EmptyCommand(location.path.clone()).into());
    }

    let script = location
        .script
        .as_ref()
        .map(|script| load_script(base_dir.join(script)))
        .transpose()?;

    let templates = location
        .command
        .iter()
        .enumerate()
        .map(|(index, source)| {
            CommandTemplate::compile(source, script.as_ref()).map_err(|source| {
                ConfigError::Template {
                    path: location.path.clone(),
                    index,
                    source,
                }
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(path = %location.path, argc = templates.len(), "Location compiled");
    Ok(Location::new(&location.path, templates)?)
}

fn load_script(path: PathBuf) -> Result<Digest, ConfigError> {
    match read_conf_file(&path) {
        Ok(body) => {
            let digest = Digest::of(&body);
            debug!(path = %path.display(), %digest, "Script loaded");
            Ok(digest)
        }
        Err(err) if err.is_not_found() => Err(ConfigError::ScriptMissing(path)),
        Err(err) => Err(err.into()),
    }
}
