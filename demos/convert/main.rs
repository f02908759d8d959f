//! Converts a CityJSON file and prints the run summary.
//!
//! Usage:
//! ```text
//! cargo run --example convert -- <file.city.json> [lat lon]
//! cargo run --example convert --features proj -- <file.city.json> 52.0116 4.3571
//! ```
//!
//! Without the `proj` feature only Web Mercator documents are georeferenced.
//! When several levels of detail coexist the finest one is built.

use std::process::ExitCode;

use citysolid::reference::GeodeticPoint;
use citysolid::tessellation::TessellationParams;
use citysolid::{Convert, ConvertParams};

fn main() -> ExitCode {
    // Default: WARN for everything, INFO for citysolid.
    // Override with RUST_LOG env var (e.g. RUST_LOG=citysolid=debug).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("citysolid=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(path) = args.first() else {
        eprintln!("usage: convert <file.city.json> [lat lon]");
        return ExitCode::FAILURE;
    };
    let anchor = match (args.get(1), args.get(2)) {
        (Some(lat), Some(lon)) => match (lat.parse(), lon.parse()) {
            (Ok(lat), Ok(lon)) => GeodeticPoint::new(lat, lon),
            _ => {
                eprintln!("anchor must be two numbers: lat lon");
                return ExitCode::FAILURE;
            }
        },
        _ => GeodeticPoint::default(),
    };

    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("{path}: {e}");
            return ExitCode::FAILURE;
        }
    };

    #[cfg(feature = "proj")]
    let frame = citysolid::reference::ProjReprojector;
    #[cfg(not(feature = "proj"))]
    let frame = citysolid::reference::WebMercator;

    let finest = |candidates: &[String]| candidates.iter().max().cloned();
    let params = ConvertParams::default().with_anchor(anchor).with_parallel(true);
    let conversion = match Convert::new(params, &frame, &finest).execute(&text) {
        Ok(conversion) => conversion,
        Err(e) => {
            eprintln!("{path}: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut triangles = 0;
    for solid in &conversion.solids {
        match solid.tessellate(TessellationParams::default()) {
            Ok(mesh) => triangles += mesh.triangle_count(),
            Err(e) => eprintln!("{}: {e}", solid.source_object_id),
        }
    }

    println!("{}", conversion.report);
    println!("{triangles} triangles");
    if let Some(bounds) = conversion.report.bounds {
        let size = bounds.size();
        println!("extent {:.1} x {:.1} x {:.1}", size.x, size.y, size.z);
    }
    ExitCode::SUCCESS
}
