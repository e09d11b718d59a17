//! One handler per diagnostics endpoint.

use http::StatusCode;
use serde::Serialize;
use tracing::{error, warn};

use super::{ApiError, Diagnostics};
use crate::core::{Iso8601Timestamp, Request, Response};
use crate::dns::{lookup_domain, validate_domain, LookupError};
use crate::probe::{latency::measure_latency, validate_host};

type HandlerResult = Result<Response, ApiError>;

#[derive(Serialize)]
struct Health<'a> {
    status: &'static str,
    timestamp: Iso8601Timestamp,
    service: &'a str,
    version: &'static str,
}

#[derive(Serialize)]
struct PublicIp {
    ip: String,
    timestamp: Iso8601Timestamp,
    success: bool,
}

#[derive(Serialize)]
struct PingReport {
    success: bool,
    output: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NetworkInfo {
    public_ip: String,
    isp: String,
    location: String,
    latency: f64,
}

pub(super) fn health(diag: &Diagnostics) -> Response {
    Response::json(
        StatusCode::OK,
        &Health {
            status: "healthy",
            timestamp: Iso8601Timestamp::now(),
            service: &diag.settings.service_name,
            version: crate::VERSION,
        },
    )
}

pub(super) async fn get_ip(diag: &Diagnostics) -> HandlerResult {
    let client = &diag.adapters.public_ip;

    let ip = client.public_ip().await.map_err(|e| {
        error!(operation = "get_ip", url = e.url(), error = %e, "public IP lookup failed");
        ApiError::public_ip(&e)
    })?;

    Ok(Response::json(
        StatusCode::OK,
        &PublicIp {
            ip,
            timestamp: Iso8601Timestamp::now(),
            success: true,
        },
    ))
}

pub(super) async fn dns_lookup(diag: &Diagnostics, req: &Request) -> HandlerResult {
    let raw = req.query_param("domain");
    let domain = validate_domain(raw.as_deref())?;

    let resolver = diag.adapters.resolver.as_ref();
    let result = lookup_domain(resolver, domain, diag.settings.dns_query_timeout)
        .await
        .map_err(|e| {
            match &e {
                LookupError::ResolutionFailed(failure) => {
                    warn!(operation = "dns_lookup", domain, error = %failure.message, "primary resolution failed")
                }
                other => warn!(operation = "dns_lookup", domain, error = %other, "lookup failed"),
            }
            ApiError::from(e)
        })?;

    Ok(Response::json(StatusCode::OK, &result))
}

pub(super) async fn ping(diag: &Diagnostics, req: &Request) -> HandlerResult {
    let raw = req.query_param("host");
    let host = validate_host(raw.as_deref())?;

    let probe = &diag.adapters.probe;
    let output = probe.ping(host).await.map_err(|e| {
        warn!(operation = "ping", host, probe = probe.name(), error = %e, "ping failed");
        ApiError::from(e)
    })?;

    Ok(Response::json(
        StatusCode::OK,
        &PingReport {
            success: true,
            output,
        },
    ))
}

pub(super) async fn system_info(diag: &Diagnostics) -> HandlerResult {
    let host = &diag.adapters.host;

    let snapshot = host.snapshot().await.map_err(|e| {
        error!(operation = "system_info", metrics = host.name(), error = %e, "host metrics unavailable");
        ApiError::from(e)
    })?;

    Ok(Response::json(StatusCode::OK, &snapshot))
}

pub(super) async fn network_info(diag: &Diagnostics) -> HandlerResult {
    let client = &diag.adapters.public_ip;
    let fail = |e: crate::upstream::UpstreamError| {
        error!(operation = "network_info", url = e.url(), error = %e, "network info lookup failed");
        ApiError::network_info(&e)
    };

    let public_ip = client.public_ip().await.map_err(fail)?;
    let geo = client.geolocate(&public_ip).await.map_err(fail)?;
    let latency = measure_latency(diag.adapters.probe.as_ref(), &diag.settings.latency_target).await;

    Ok(Response::json(
        StatusCode::OK,
        &NetworkInfo {
            public_ip,
            isp: geo.isp,
            location: geo.location,
            latency,
        },
    ))
}
