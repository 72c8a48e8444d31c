use crate::data::route::{Coordinate, RouteChunk};
use crate::errors::{Error, Result};

/// Splits the route into contiguous chunks of `ceil(n / chunks)` points, the
/// last one possibly shorter. Order is preserved and no chunk is empty.
pub fn split_route(points: &[Coordinate], chunks: usize) -> Result<Vec<RouteChunk>> {
    if points.is_empty() {
        return Err(Error::input("no route points provided"));
    }
    let chunks = chunks.max(1);
    let chunk_size = points.len().div_ceil(chunks).max(1);
    Ok(points.chunks(chunk_size).map(|chunk| chunk.to_vec()).collect())
}
