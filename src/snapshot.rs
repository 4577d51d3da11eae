//! Text snapshot persistence for the graph.
//!
//! A snapshot is a single LF-terminated text file of comma-separated fields,
//! no quoting (labels therefore must not contain `,` or newlines):
//!
//! - Header line: `nodes_count,max_id,entry_point_id,dim,m,m0,`
//!   `ef_construction,ef_search,ml,keep_pruned`
//! - `nodes_count` node lines: `id,name,v[0],...,v[dim-1],layers_count`
//! - One edge line per (node, layer): `node_id,layer,degree,neighbor_id,...`
//!
//! Saving walks the layer-0 edges from the entry point, which covers every
//! node. Loading allocates a node table of `max_id + 1` slots, fills it from
//! the node lines, then rebuilds each adjacency list from the edge lines by
//! id. Floats are printed with Rust's shortest-round-trip formatting, so
//! save, load, save again reproduces the file byte for byte.

use crate::distance::{Euclidean, Metric};
use crate::error::{Error, Result};
use crate::index::Index;
use crate::node::{Node, NodeRef};
use crate::Settings;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

impl Index {
    /// Serialize the whole graph to a snapshot file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `Error::EmptyIndex` if nothing has been inserted (the header
    /// has no entry point to name), `Error::InvalidArgument` for an empty
    /// path, and `Error::Io` if the file cannot be created or written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(Error::invalid_arg("path", "snapshot path must not be empty"));
        }

        let entry = self.entry_point().ok_or(Error::EmptyIndex)?;
        let nodes = self.collect_nodes();
        let max_id = self.len().saturating_sub(1);

        let file = File::create(path).map_err(Error::io_err(path, "failed to create snapshot"))?;
        let mut writer = BufWriter::new(file);

        self.dump(&nodes, entry.id, max_id, &mut writer)
            .and_then(|_| writer.flush())
            .map_err(Error::io_err(path, "failed to write snapshot"))?;

        Ok(())
    }

    fn dump(
        &self,
        nodes: &[NodeRef],
        entry_id: u32,
        max_id: usize,
        writer: &mut impl Write,
    ) -> io::Result<()> {
        let s = self.settings();
        writeln!(
            writer,
            "{},{},{},{},{},{},{},{},{},{}",
            nodes.len(),
            max_id,
            entry_id,
            self.descriptor_size(),
            s.m,
            s.m0,
            s.ef_construction,
            s.ef_search,
            s.ml,
            s.keep_pruned as u8,
        )?;

        for node in nodes {
            write!(writer, "{},{}", node.id, node.name)?;
            for value in &node.descriptor {
                write!(writer, ",{}", value)?;
            }
            writeln!(writer, ",{}", node.layers_count())?;
        }

        for node in nodes {
            for layer in 0..node.layers_count() {
                // Snapshot under the layer lock. Neighbor ids past the
                // walk's id bound belong to concurrent inserts and are left
                // out; the node table could not resolve them.
                let hood: Vec<u32> = node
                    .neighbours(layer)
                    .lock()
                    .iter()
                    .map(|n| n.id)
                    .filter(|&id| id as usize <= max_id)
                    .collect();

                write!(writer, "{},{},{}", node.id, layer, hood.len())?;
                for id in hood {
                    write!(writer, ",{}", id)?;
                }
                writeln!(writer)?;
            }
        }

        Ok(())
    }

    /// Restore an index from a snapshot file, with the Euclidean metric.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be opened or read,
    /// `Error::MalformedSnapshot` if parsing fails, and
    /// `Error::InvalidArgument` if the header carries settings that violate
    /// their constraints.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_metric(path, Arc::new(Euclidean))
    }

    /// Restore an index from a snapshot file with a caller-provided metric.
    ///
    /// The metric is not recorded in the snapshot; callers must supply the
    /// one the index was built with, or searches will rank by the wrong
    /// distances.
    pub fn open_with_metric(path: impl AsRef<Path>, metric: Arc<dyn Metric>) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(Error::invalid_arg("path", "snapshot path must not be empty"));
        }

        let file = File::open(path).map_err(Error::io_err(path, "failed to open snapshot"))?;
        let mut reader = Lines::new(BufReader::new(file), path);

        // Header
        let line = reader
            .next_line()?
            .ok_or_else(|| Error::malformed(path, 1, "missing header"))?;
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != 10 {
            return Err(Error::malformed(
                path,
                1,
                format!("header has {} fields, expected 10", fields.len()),
            ));
        }

        let nodes_count: usize = parse_field(path, 1, "node count", fields[0])?;
        let max_id: u32 = parse_field(path, 1, "max id", fields[1])?;
        let entry_id: u32 = parse_field(path, 1, "entry point id", fields[2])?;
        let dim: usize = parse_field(path, 1, "dimension", fields[3])?;
        let settings = Settings {
            m: parse_field(path, 1, "m", fields[4])?,
            m0: parse_field(path, 1, "m0", fields[5])?,
            ef_construction: parse_field(path, 1, "ef_construction", fields[6])?,
            ef_search: parse_field(path, 1, "ef_search", fields[7])?,
            ml: parse_field(path, 1, "ml", fields[8])?,
            keep_pruned: parse_field::<u8>(path, 1, "keep_pruned", fields[9])? != 0,
        };

        if dim == 0 {
            return Err(Error::malformed(path, 1, "dimension must be positive"));
        }
        settings.validate()?;

        // Node table, indexed by dense id. Slots stay empty for id gaps.
        let mut table: Vec<Option<NodeRef>> = vec![None; max_id as usize + 1];

        for _ in 0..nodes_count {
            let line_no = reader.line_no + 1;
            let line = reader
                .next_line()?
                .ok_or_else(|| Error::malformed(path, line_no, "unexpected end of node table"))?;
            let fields: Vec<&str> = line.split(',').collect();
            if fields.len() != dim + 3 {
                return Err(Error::malformed(
                    path,
                    line_no,
                    format!("node line has {} fields, expected {}", fields.len(), dim + 3),
                ));
            }

            let id: u32 = parse_field(path, line_no, "node id", fields[0])?;
            if id > max_id {
                return Err(Error::malformed(
                    path,
                    line_no,
                    format!("node id {} out of range (max id {})", id, max_id),
                ));
            }

            let name = fields[1].to_string();

            let mut descriptor = Vec::with_capacity(dim);
            for raw in &fields[2..2 + dim] {
                descriptor.push(parse_field(path, line_no, "descriptor component", raw)?);
            }

            let layers_count: usize =
                parse_field(path, line_no, "layer count", fields[dim + 2])?;
            if layers_count == 0 {
                return Err(Error::malformed(
                    path,
                    line_no,
                    "node must exist on at least one layer",
                ));
            }

            let slot = &mut table[id as usize];
            if slot.is_some() {
                return Err(Error::malformed(
                    path,
                    line_no,
                    format!("duplicate node id {}", id),
                ));
            }
            *slot = Some(Arc::new(Node::new(
                id,
                name,
                descriptor,
                layers_count,
                settings.m + 1,
                settings.m0 + 1,
            )));
        }

        let entry = table
            .get(entry_id as usize)
            .and_then(|slot| slot.clone())
            .ok_or_else(|| {
                Error::malformed(path, 1, format!("entry point id {} not present", entry_id))
            })?;

        // Edge table
        loop {
            let line_no = reader.line_no + 1;
            let Some(line) = reader.next_line()? else {
                break;
            };
            let fields: Vec<&str> = line.split(',').collect();
            if fields.len() < 3 {
                return Err(Error::malformed(
                    path,
                    line_no,
                    "edge line needs node id, layer, and degree",
                ));
            }

            let node_id: u32 = parse_field(path, line_no, "node id", fields[0])?;
            let layer: usize = parse_field(path, line_no, "layer", fields[1])?;
            let degree: usize = parse_field(path, line_no, "degree", fields[2])?;

            if fields.len() != degree + 3 {
                return Err(Error::malformed(
                    path,
                    line_no,
                    format!(
                        "edge line lists {} neighbors, header says {}",
                        fields.len() - 3,
                        degree
                    ),
                ));
            }

            let node = table
                .get(node_id as usize)
                .and_then(|slot| slot.clone())
                .ok_or_else(|| {
                    Error::malformed(path, line_no, format!("unknown node id {}", node_id))
                })?;
            if layer >= node.layers_count() {
                return Err(Error::malformed(
                    path,
                    line_no,
                    format!(
                        "layer {} out of range for node {} ({} layers)",
                        layer,
                        node_id,
                        node.layers_count()
                    ),
                ));
            }

            let mut hood = node.neighbours(layer).lock();
            for raw in &fields[3..] {
                let neighbour_id: u32 = parse_field(path, line_no, "neighbor id", raw)?;
                let neighbour = table
                    .get(neighbour_id as usize)
                    .and_then(|slot| slot.clone())
                    .ok_or_else(|| {
                        Error::malformed(
                            path,
                            line_no,
                            format!("neighbor id {} out of range", neighbour_id),
                        )
                    })?;
                hood.push(neighbour);
            }
        }

        Ok(Index::assemble(dim, settings, metric, entry, max_id + 1))
    }
}

/// Line reader that strips terminators and tracks line numbers for errors.
struct Lines<R> {
    reader: R,
    path: std::path::PathBuf,
    buf: String,
    line_no: u64,
}

impl<R: BufRead> Lines<R> {
    fn new(reader: R, path: &Path) -> Self {
        Self {
            reader,
            path: path.to_path_buf(),
            buf: String::new(),
            line_no: 0,
        }
    }

    fn next_line(&mut self) -> Result<Option<&str>> {
        self.buf.clear();
        let read = self
            .reader
            .read_line(&mut self.buf)
            .map_err(Error::io_err(&self.path, "failed to read snapshot"))?;
        if read == 0 {
            return Ok(None);
        }

        self.line_no += 1;
        Ok(Some(self.buf.trim_end_matches(['\n', '\r'])))
    }
}

fn parse_field<T: FromStr>(path: &Path, line: u64, what: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| Error::malformed(path, line, format!("invalid {}: {:?}", what, raw)))
}
