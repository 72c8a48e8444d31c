use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use log::info;

use crate::config::{OutputFormat, UserConfig};
use crate::data::osm::ElementKind;
use crate::data::poi::{sort_for_output, Poi};
use crate::data::route::RouteChunk;
use crate::data::rules::Rule;
use crate::errors::{Error, Result};
use crate::etl::aggregate::resolve;
use crate::etl::cache::{QueryCache, Transport};
use crate::etl::classify::{build_poi, ClassificationStats};
use crate::etl::decode::decode;
use crate::etl::query::compile;
use crate::etl::segment::split_route;
use crate::etl::Etl;
use crate::gpx;

const ETL_NAME: &str = "route_pois";
const QUERY_KINDS: [ElementKind; 2] = [ElementKind::Node, ElementKind::Way];

/// Finds POIs along a GPX route: one node and one way query per chunk and rule.
pub struct RoutePoiEtl<T: Transport> {
    route_path: PathBuf,
    chunks: usize,
    rules: Vec<Rule>,
    output_format: OutputFormat,
    cache: QueryCache<T>,
}

impl<T: Transport> RoutePoiEtl<T> {
    pub fn new(config: &UserConfig, rules: Vec<Rule>, cache: QueryCache<T>) -> RoutePoiEtl<T> {
        RoutePoiEtl {
            route_path: config.route_path.clone(),
            chunks: config.chunks,
            rules,
            output_format: config.output_format,
            cache,
        }
    }

    pub fn output_path(&self, dir: &Path) -> PathBuf {
        dir.join(self.output_format.file_name())
    }

    fn query_pois(
        &self,
        kind: ElementKind,
        rule: &Rule,
        chunk: &RouteChunk,
        stats: &mut ClassificationStats,
    ) -> Result<Vec<Poi>> {
        let query = compile(kind, rule, chunk)?;
        let body = self.cache.fetch(&query)?;
        let resolved = resolve(decode(&body)?)?;
        info!(
            kind = kind.as_str(),
            points = resolved.points.len(),
            ways = resolved.way_centroids.len();
            "Query resolved"
        );

        match kind {
            ElementKind::Node => {
                if let Some(way) = resolved.way_centroids.first() {
                    return Err(Error::consistency(format!("node query returned way {}", way.id)));
                }
                resolved.points
                    .iter()
                    .map(|point| {
                        build_poi(&point.tags, point.at, stats).map_err(|err| err.context(format!("node {}", point.id)))
                    })
                    .collect()
            }
            ElementKind::Way => resolved.way_centroids
                .iter()
                .map(|way| {
                    build_poi(&way.tags, way.centre, stats).map_err(|err| err.context(format!("way {}", way.id)))
                })
                .collect(),
        }
    }
}

impl<T: Transport> Etl for RoutePoiEtl<T> {
    type Input = Vec<RouteChunk>;
    type Output = Vec<Poi>;

    fn etl_name(&self) -> &str {
        ETL_NAME
    }

    fn extract(&mut self) -> Result<Self::Input> {
        let points = gpx::read_track(&self.route_path)?;
        let chunks = split_route(&points, self.chunks)?;
        info!(
            etl_name = ETL_NAME,
            points = points.len(),
            chunks = chunks.len();
            "Route split"
        );
        Ok(chunks)
    }

    fn transform(&mut self, input: Self::Input) -> Result<Self::Output> {
        let mut stats = ClassificationStats::default();
        let mut pois = Vec::new();

        for (chunk_idx, chunk) in tqdm::tqdm(input.iter().enumerate()) {
            for (rule_idx, rule) in self.rules.iter().enumerate() {
                for kind in QUERY_KINDS {
                    let found = self.query_pois(kind, rule, chunk, &mut stats)
                        .map_err(|err| {
                            err.context(format!("chunk {}, rule #{}, {} query", chunk_idx + 1, rule_idx + 1, kind))
                        })?;
                    pois.extend(found);
                }
            }
        }

        sort_for_output(&mut pois);
        stats.log_summary();
        Ok(pois)
    }

    fn load(&mut self, dir: &Path, output: Self::Output) -> Result<()> {
        let path = self.output_path(dir);
        let file = BufWriter::new(File::create(&path)?);
        match self.output_format {
            OutputFormat::Gpx => gpx::write_waypoints(file, &output)?,
            OutputFormat::Json => gpx::write_json(file, &output)?,
        }
        info!(etl_name = ETL_NAME, pois = output.len(), output = path.display().to_string().as_str(); "Output written");
        Ok(())
    }
}
