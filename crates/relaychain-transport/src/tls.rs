//! Client TLS configuration loading.
//!
//! Every connector and dialer gets its own [`ClientTlsConfig`], loaded from
//! the TLS block of its configuration:
//!
//! - `secure = false`: the server certificate is not verified.
//! - `secure = true` with `ca_file`: only that CA is trusted.
//! - `secure = true` without `ca_file`: the bundled web PKI roots are trusted.
//! - `cert_file` + `key_file`: presented as the client certificate.
//!
//! A configured `ca_file` must be readable whatever the `secure` flag says.

use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use relaychain_config::TlsConfig;
use relaychain_core::host_of;
use rustls::RootCertStore;
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, PrivateKeyDer, ServerName};
use tokio_rustls::TlsConnector;

use crate::error::TransportError;

/// TLS settings with "not provided" made explicit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsOptions {
    pub cert_file: Option<PathBuf>,
    pub key_file: Option<PathBuf>,
    pub ca_file: Option<PathBuf>,
    pub secure: bool,
    pub server_name: Option<String>,
}

impl TlsOptions {
    /// An absent TLS block is equivalent to an empty one.
    pub fn from_config(cfg: Option<&TlsConfig>) -> Self {
        cfg.map(Self::from).unwrap_or_default()
    }
}

impl From<&TlsConfig> for TlsOptions {
    fn from(cfg: &TlsConfig) -> Self {
        Self {
            cert_file: non_empty(&cfg.cert_file).map(PathBuf::from),
            key_file: non_empty(&cfg.key_file).map(PathBuf::from),
            ca_file: non_empty(&cfg.ca_file).map(PathBuf::from),
            secure: cfg.secure,
            server_name: non_empty(&cfg.server_name).map(str::to_string),
        }
    }
}

fn non_empty(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty()).then_some(s)
}

/// Loaded client TLS configuration, ready to wrap streams.
#[derive(Clone)]
pub struct ClientTlsConfig {
    config: Arc<rustls::ClientConfig>,
    server_name: Option<String>,
    secure: bool,
}

impl ClientTlsConfig {
    pub fn rustls_config(&self) -> &Arc<rustls::ClientConfig> {
        &self.config
    }

    pub fn connector(&self) -> TlsConnector {
        TlsConnector::from(Arc::clone(&self.config))
    }

    /// Configured server name, if any.
    pub fn server_name(&self) -> Option<&str> {
        self.server_name.as_deref()
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// SNI for a connection to `addr`: the configured name, else the host
    /// part of `addr`.
    pub fn resolve_server_name(&self, addr: &str) -> Result<ServerName<'static>, TransportError> {
        let host = self.server_name.as_deref().unwrap_or_else(|| host_of(addr));
        ServerName::try_from(host.to_string())
            .map_err(|e| TransportError::Config(format!("invalid TLS server name '{host}': {e}")))
    }
}

impl fmt::Debug for ClientTlsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientTlsConfig")
            .field("server_name", &self.server_name)
            .field("secure", &self.secure)
            .finish_non_exhaustive()
    }
}

/// Build a client TLS configuration.
pub fn load_client_config(opts: &TlsOptions) -> Result<ClientTlsConfig, TransportError> {
    let client_cert = match (&opts.cert_file, &opts.key_file) {
        (Some(cert), Some(key)) => Some((load_certs(cert)?, load_key(key)?)),
        (None, None) => None,
        (Some(_), None) => {
            return Err(TransportError::Config(
                "TLS cert_file is set but key_file is missing".into(),
            ));
        }
        (None, Some(_)) => {
            return Err(TransportError::Config(
                "TLS key_file is set but cert_file is missing".into(),
            ));
        }
    };

    // The CA file is read even when verification is off; an unreadable file
    // is still a load error.
    let ca_roots = opts.ca_file.as_deref().map(load_certs).transpose()?;

    let provider = Arc::new(rustls::crypto::aws_lc_rs::default_provider());
    let builder = rustls::ClientConfig::builder_with_provider(Arc::clone(&provider))
        .with_safe_default_protocol_versions()?;

    let builder = if opts.secure {
        let mut roots = RootCertStore::empty();
        match ca_roots {
            Some(certs) => {
                for cert in certs {
                    roots.add(cert)?;
                }
            }
            None => roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned()),
        }
        builder.with_root_certificates(roots)
    } else {
        builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(NoVerifier(provider)))
    };

    let config = match client_cert {
        Some((certs, key)) => builder.with_client_auth_cert(certs, key)?,
        None => builder.with_no_client_auth(),
    };

    Ok(ClientTlsConfig {
        config: Arc::new(config),
        server_name: opts.server_name.clone(),
        secure: opts.secure,
    })
}

fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>, TransportError> {
    let mut reader = open(path)?;
    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            TransportError::Config(format!("failed to parse {}: {e}", path.display()))
        })?;

    if certs.is_empty() {
        return Err(TransportError::Config(format!(
            "no certificates found in {}",
            path.display()
        )));
    }
    Ok(certs)
}

fn load_key(path: &Path) -> Result<PrivateKeyDer<'static>, TransportError> {
    let mut reader = open(path)?;
    rustls_pemfile::private_key(&mut reader)
        .map_err(|e| TransportError::Config(format!("failed to parse {}: {e}", path.display())))?
        .ok_or_else(|| {
            TransportError::Config(format!("no private key found in {}", path.display()))
        })
}

fn open(path: &Path) -> Result<BufReader<File>, TransportError> {
    File::open(path).map(BufReader::new).map_err(|e| {
        TransportError::Config(format!("failed to read {}: {e}", path.display()))
    })
}

/// Accepts any server certificate (`secure = false`).
#[derive(Debug)]
struct NoVerifier(Arc<CryptoProvider>);

impl rustls::client::danger::ServerCertVerifier for NoVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: rustls::pki_types::UnixTime,
    ) -> Result<rustls::client::danger::ServerCertVerified, rustls::Error> {
        Ok(rustls::client::danger::ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        self.0.signature_verification_algorithms.supported_schemes()
    }
}
