use std::{
    fs::File,
    io::BufReader,
    net::SocketAddr,
    path::{Path, PathBuf},
};

use actix_files::{Files, NamedFile};
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, Result, middleware::Logger, web};
use anyhow::{Context, anyhow};
use log::info;
use rustls::{
    pki_types::{CertificateDer, PrivateKeyDer},
    server::ServerConfig,
};
use rustls_pemfile::{certs, private_key};

/* ---------- configuration ------------------------------------------------ */

#[derive(Debug, Clone, PartialEq)]
struct Config {
    bind:     SocketAddr,
    dist_dir: PathBuf,
    tls:      Option<(PathBuf, PathBuf)>,
}

impl Config {
    /// Reads `BIND_ADDR`, `DIST_DIR`, `TLS_CERT`, `TLS_KEY` through `lookup`.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let bind = lookup("BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8444".into())
            .parse()
            .context("BIND_ADDR is not a socket address")?;

        // bundle produced by `trunk build`
        let dist_dir = lookup("DIST_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| Path::new(env!("CARGO_MANIFEST_DIR")).join("../frontend/dist"));

        let tls = match (lookup("TLS_CERT"), lookup("TLS_KEY")) {
            (Some(cert), Some(key)) => Some((cert.into(), key.into())),
            (None, None) => None,
            _ => return Err(anyhow!("TLS_CERT and TLS_KEY must be set together")),
        };

        Ok(Self { bind, dist_dir, tls })
    }
}

/* ---------- TLS ---------------------------------------------------------- */

fn build_tls_config(cert_path: &Path, key_path: &Path) -> anyhow::Result<ServerConfig> {
    let mut r = BufReader::new(
        File::open(cert_path).with_context(|| format!("open {}", cert_path.display()))?,
    );
    let chain: Vec<CertificateDer<'static>> =
        certs(&mut r).collect::<Result<_, _>>().context("parse certificate")?;

    let mut r = BufReader::new(
        File::open(key_path).with_context(|| format!("open {}", key_path.display()))?,
    );
    let key: PrivateKeyDer<'static> = private_key(&mut r)
        .context("parse private key")?
        .ok_or_else(|| anyhow!("no private key in {}", key_path.display()))?;

    ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(chain, key)
        .context("TLS config")
}

/* ---------- SPA fallback (index.html) ------------------------------------ */

async fn spa_fallback(req: HttpRequest, dist: web::Data<PathBuf>) -> Result<HttpResponse> {
    Ok(NamedFile::open(dist.join("index.html"))?.into_response(&req))
}

/* ---------- main --------------------------------------------------------- */

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_lookup(|k| std::env::var(k).ok())?;
    info!("serving {} on {}", config.dist_dir.display(), config.bind);

    let dist = config.dist_dir.clone();
    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(dist.clone()))
            .service(Files::new("/", &dist).index_file("index.html"))
            .default_service(web::to(spa_fallback))
    });

    let server = match &config.tls {
        Some((cert, key)) => {
            info!("TLS enabled");
            server.bind_rustls_0_23(config.bind, build_tls_config(cert, key)?)?
        }
        None => server.bind(config.bind)?,
    };

    server.run().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults() {
        let c = config(&[]).unwrap();
        assert_eq!(c.bind, "0.0.0.0:8444".parse().unwrap());
        assert!(c.dist_dir.ends_with("frontend/dist"));
        assert_eq!(c.tls, None);
    }

    #[test]
    fn overrides() {
        let c = config(&[("BIND_ADDR", "127.0.0.1:9000"), ("DIST_DIR", "/srv/app")]).unwrap();
        assert_eq!(c.bind.port(), 9000);
        assert_eq!(c.dist_dir, PathBuf::from("/srv/app"));
    }

    #[test]
    fn tls_needs_both_files() {
        assert!(config(&[("TLS_CERT", "c.pem")]).is_err());
        assert!(config(&[("TLS_KEY", "k.pem")]).is_err());

        let c = config(&[("TLS_CERT", "c.pem"), ("TLS_KEY", "k.pem")]).unwrap();
        assert_eq!(c.tls, Some((PathBuf::from("c.pem"), PathBuf::from("k.pem"))));
    }

    #[test]
    fn rejects_bad_address() {
        assert!(config(&[("BIND_ADDR", "not-an-addr")]).is_err());
    }
}
