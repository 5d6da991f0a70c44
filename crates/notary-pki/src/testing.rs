//! Certificate fixtures generated at runtime with `rcgen`.
//!
//! Only compiled for tests or with the `test-utils` feature.

#![allow(clippy::expect_used)]

use rcgen::{
    BasicConstraints, CertificateParams, DnType, IsCa, Issuer, KeyPair, KeyUsagePurpose,
};

/// A certificate authority that can issue subordinates and leaf certificates.
pub struct TestAuthority {
    params: CertificateParams,
    key_pair: KeyPair,
    /// PEM-encoded certificate of this authority.
    pub cert_pem: String,
}

/// A key pair plus the PEM-encoded CSR for it.
pub struct TestRequest {
    params: CertificateParams,
    key_pair: KeyPair,
    /// PEM-encoded PKCS#10 request.
    pub csr_pem: String,
}

fn authority_params(name: &str, is_ca: bool) -> CertificateParams {
    let mut params = CertificateParams::default();
    params.distinguished_name.push(DnType::CommonName, name);
    params
        .distinguished_name
        .push(DnType::OrganizationName, "Notary Test");
    if is_ca {
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        params.key_usages.push(KeyUsagePurpose::KeyCertSign);
    } else {
        params.is_ca = IsCa::ExplicitNoCa;
    }
    params
}

impl TestAuthority {
    /// Self-signed root CA.
    pub fn root(name: &str) -> Self {
        let params = authority_params(name, true);
        let key_pair = KeyPair::generate().expect("generate root key");
        let cert = params.self_signed(&key_pair).expect("self-sign root");
        Self {
            cert_pem: cert.pem(),
            params,
            key_pair,
        }
    }

    /// Certificate signed by this authority, optionally carrying the CA flag.
    pub fn subordinate(&self, name: &str, is_ca: bool) -> Self {
        let issuer = Issuer::from_params(&self.params, &self.key_pair);
        let params = authority_params(name, is_ca);
        let key_pair = KeyPair::generate().expect("generate subordinate key");
        let cert = params
            .signed_by(&key_pair, &issuer)
            .expect("sign subordinate");
        Self {
            cert_pem: cert.pem(),
            params,
            key_pair,
        }
    }

    /// Issue a leaf certificate for the key and subject in `request`.
    pub fn issue(&self, request: &TestRequest) -> String {
        let issuer = Issuer::from_params(&self.params, &self.key_pair);
        request
            .params
            .signed_by(&request.key_pair, &issuer)
            .expect("sign leaf")
            .pem()
    }
}

impl TestRequest {
    /// Fresh key pair and CSR for `common_name`.
    pub fn new(common_name: &str) -> Self {
        let mut params =
            CertificateParams::new(vec![common_name.to_string()]).expect("leaf params");
        params
            .distinguished_name
            .push(DnType::CommonName, common_name);
        let key_pair = KeyPair::generate().expect("generate leaf key");
        let csr_pem = params
            .serialize_request(&key_pair)
            .expect("serialize CSR")
            .pem()
            .expect("encode CSR");
        Self {
            params,
            key_pair,
            csr_pem,
        }
    }
}

/// Join PEM blocks into a canonical bundle: trimmed, newline separated.
pub fn join_chain(pems: &[&str]) -> String {
    pems.iter()
        .map(|p| p.trim())
        .collect::<Vec<_>>()
        .join("\n")
}
