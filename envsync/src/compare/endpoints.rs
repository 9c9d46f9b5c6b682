//! API surface comparison: services and their endpoints.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::model::Environment;

/// Endpoints whose `METHOD path` shape disagrees across environments,
/// including endpoints absent from some environments.
#[derive(Debug, Clone, Serialize)]
pub struct EndpointReport {
    pub environments: Vec<String>,
    pub rows: Vec<EndpointRow>,
}

impl EndpointReport {
    pub fn has_differences(&self) -> bool {
        !self.rows.is_empty()
    }
}

/// Per-environment shape of one endpoint, `""` where it does not exist.
#[derive(Debug, Clone, Serialize)]
pub struct EndpointRow {
    pub service: String,
    pub endpoint: String,
    pub signatures: Vec<String>,
}

/// Compare service endpoints across environments, sorted by service then
/// endpoint name.
pub fn compare_endpoints(environments: &[Environment]) -> EndpointReport {
    let names: Vec<String> = environments.iter().map(|env| env.name.clone()).collect();

    let mut by_endpoint: BTreeMap<(&str, &str), Vec<String>> = BTreeMap::new();
    for (position, environment) in environments.iter().enumerate() {
        for service in &environment.services {
            for endpoint in &service.endpoints {
                by_endpoint
                    .entry((&service.name, &endpoint.name))
                    .or_insert_with(|| vec![String::new(); environments.len()])[position] =
                    endpoint.signature();
            }
        }
    }

    let rows = by_endpoint
        .into_iter()
        .filter(|(_, signatures)| signatures.iter().collect::<HashSet<_>>().len() > 1)
        .map(|((service, endpoint), signatures)| EndpointRow {
            service: service.to_string(),
            endpoint: endpoint.to_string(),
            signatures,
        })
        .collect();

    EndpointReport {
        environments: names,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Endpoint, Service};

    fn environment(name: &str, services: Vec<Service>) -> Environment {
        Environment {
            id: format!("{name}-id"),
            name: name.to_string(),
            tables: Vec::new(),
            roles: Vec::new(),
            services,
            api_keys: Vec::new(),
        }
    }

    fn service(name: &str, endpoints: &[(&str, &str, &str)]) -> Service {
        Service {
            name: name.to_string(),
            endpoints: endpoints
                .iter()
                .map(|(endpoint, method, path)| Endpoint {
                    name: endpoint.to_string(),
                    method: method.to_string(),
                    path: path.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_method_change_is_reported() {
        let report = compare_endpoints(&[
            environment("dev", vec![service("orders", &[("list", "GET", "/orders")])]),
            environment("prod", vec![service("orders", &[("list", "POST", "/orders")])]),
        ]);

        assert!(report.has_differences());
        assert_eq!(report.rows[0].service, "orders");
        assert_eq!(report.rows[0].endpoint, "list");
        assert_eq!(report.rows[0].signatures, ["GET /orders", "POST /orders"]);
    }

    #[test]
    fn test_missing_endpoint_is_reported_as_empty() {
        let report = compare_endpoints(&[
            environment("dev", vec![service("orders", &[("cancel", "DELETE", "/orders/{id}")])]),
            environment("prod", vec![service("orders", &[])]),
        ]);

        assert_eq!(report.rows[0].signatures, ["DELETE /orders/{id}", ""]);
    }

    #[test]
    fn test_matching_surfaces_are_silent() {
        let make = |name: &str| {
            environment(
                name,
                vec![service("orders", &[("list", "GET", "/orders"), ("get", "GET", "/orders/{id}")])],
            )
        };

        let report = compare_endpoints(&[make("dev"), make("prod")]);

        assert!(!report.has_differences());
    }
}
