// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use calico_dns_tiers::{
    constants::{DEFAULT_RESOLV_CONF_PATH, KUBE_DNS_NAMESPACE, OPENSHIFT_DNS_NAMESPACE},
    crd::PolicyObject,
    dns::{
        cluster_domain_or_default, get_cluster_dns_service, get_cluster_domain,
        get_service_dns_names, NodeLocalCacheState,
    },
    tiers::{Component, DnsIngressAllowList, TierConfig, TiersComponent},
};
use clap::{Parser, Subcommand, ValueEnum};
use k8s_openapi::api::core::v1::Service;
use kube::{Api, Client};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};


/// Cluster DNS discovery and Calico DNS access policy tiers
#[derive(Debug, Parser)]
#[command(name = "calico-dns-tiers", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the cluster domain found in the resolver configuration
    ClusterDomain {
        /// Resolver configuration to read
        #[arg(long, default_value = DEFAULT_RESOLV_CONF_PATH)]
        resolv_conf: PathBuf,

        /// Print the default cluster domain instead of failing
        #[arg(long)]
        fallback: bool,
    },

    /// Print the DNS names a service is reachable by
    ServiceNames {
        name: String,
        namespace: String,

        /// Cluster domain to use instead of reading the resolver configuration
        #[arg(long)]
        cluster_domain: Option<String>,

        /// Resolver configuration to read when no cluster domain is given
        #[arg(long, default_value = DEFAULT_RESOLV_CONF_PATH)]
        resolv_conf: PathBuf,
    },

    /// Print the tier objects to create and delete
    Render {
        /// Target an `OpenShift` cluster
        #[arg(long)]
        openshift: bool,

        /// Cluster DNS service IP fronted by an active node-local DNS cache
        #[arg(long)]
        node_local_dns_ip: Option<String>,

        /// Namespace allowed to query cluster DNS (repeatable, replaces the defaults)
        #[arg(long = "allow-namespace")]
        allow_namespaces: Vec<String>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
    },

    /// Fetch the cluster DNS service from the API server
    ClusterDnsService {
        /// Target an `OpenShift` cluster
        #[arg(long)]
        openshift: bool,

        /// Namespace to look in (defaults to the platform's DNS namespace)
        #[arg(long)]
        namespace: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

/// Document printed by `render`.
#[derive(Debug, Serialize)]
struct RenderedObjects {
    create: Vec<PolicyObject>,
    delete: Vec<PolicyObject>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("calico-dns-tiers")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli))
}

/// Initialize logging on stderr so stdout only carries command output.
///
/// Respects `RUST_LOG` (default `info`) and `RUST_LOG_FORMAT=json|text`.
fn init_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

async fn async_main(cli: Cli) -> Result<()> {
    init_logging();
    debug!("Logging initialized with file and line number tracking");

    match cli.command {
        Command::ClusterDomain {
            resolv_conf,
            fallback,
        } => {
            let domain = if fallback {
                cluster_domain_or_default(&resolv_conf)
            } else {
                get_cluster_domain(&resolv_conf).with_context(|| {
                    format!("Unable to read cluster domain from {}", resolv_conf.display())
                })?
            };
            println!("{domain}");
        }
        Command::ServiceNames {
            name,
            namespace,
            cluster_domain,
            resolv_conf,
        } => {
            let cluster_domain =
                cluster_domain.unwrap_or_else(|| cluster_domain_or_default(&resolv_conf));
            for dns_name in get_service_dns_names(&name, &namespace, &cluster_domain) {
                println!("{dns_name}");
            }
        }
        Command::Render {
            openshift,
            node_local_dns_ip,
            allow_namespaces,
            format,
        } => {
            let config = TierConfig::new(
                openshift,
                node_local_dns_ip.map(NodeLocalCacheState::enabled),
            );
            let allow_list = if allow_namespaces.is_empty() {
                DnsIngressAllowList::default()
            } else {
                DnsIngressAllowList::new(allow_namespaces)
            };
            info!("Rendering DNS policy tier for {:?}", config.access_mode);
            print!("{}", render_document(config, allow_list, format)?);
        }
        Command::ClusterDnsService {
            openshift,
            namespace,
        } => {
            let namespace =
                namespace.unwrap_or_else(|| default_dns_namespace(openshift).to_string());
            debug!("Initializing Kubernetes client");
            let client = Client::try_default().await?;
            let services: Api<Service> = Api::namespaced(client, &namespace);

            let service = get_cluster_dns_service(&services, openshift)
                .await
                .with_context(|| format!("Unable to fetch cluster DNS service in {namespace}"))?;
            info!(
                "Found cluster DNS service with cluster IP {}",
                service
                    .spec
                    .as_ref()
                    .and_then(|s| s.cluster_ip.as_deref())
                    .unwrap_or("<none>")
            );
            print!("{}", serde_yaml::to_string(&service)?);
        }
    }

    Ok(())
}

/// Namespace running the cluster DNS pods for the platform.
fn default_dns_namespace(openshift: bool) -> &'static str {
    if openshift {
        OPENSHIFT_DNS_NAMESPACE
    } else {
        KUBE_DNS_NAMESPACE
    }
}

/// Synthesizes the tier objects and serializes them as a single document.
fn render_document(
    config: TierConfig,
    allow_list: DnsIngressAllowList,
    format: OutputFormat,
) -> Result<String> {
    let (create, delete) = TiersComponent::new(config, allow_list).objects();
    let document = RenderedObjects { create, delete };

    let rendered = match format {
        OutputFormat::Yaml => serde_yaml::to_string(&document)?,
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&document)?;
            json.push('\n');
            json
        }
    };
    Ok(rendered)
}
