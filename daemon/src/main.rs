// Copyright 2025 pathvector Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use clap::Parser;
use pathvector::config::Config;
use pathvector::log::{set_level, LogLevel};
use pathvector::server::Router;
use pathvector::{error, info};

#[derive(Parser)]
#[command(name = "pathvectord")]
#[command(about = "Gao-Rexford path-vector routing daemon", version)]
struct Args {
    /// Autonomous system number of this router
    asn: u32,

    /// Neighbor descriptors, PORT-NEIGHBOR_IP-RELATION with relation one of
    /// cust, peer, prov
    #[arg(required = true)]
    neighbors: Vec<String>,

    /// Log verbosity: error, warn, info or debug
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    match LogLevel::from_str(&args.log_level) {
        Ok(level) => set_level(level),
        Err(e) => {
            error!("invalid log level", "error" => e);
            std::process::exit(1);
        }
    }

    let config = match Config::new(args.asn, &args.neighbors) {
        Ok(config) => config,
        Err(e) => {
            error!("invalid configuration", "error" => e.to_string());
            std::process::exit(1);
        }
    };

    info!("starting router", "asn" => config.asn, "neighbors" => config.neighbors.len());

    let router = match Router::new(config).await {
        Ok(router) => router,
        Err(e) => {
            error!("failed to start router", "error" => e.to_string());
            std::process::exit(1);
        }
    };

    router.run().await;
}
