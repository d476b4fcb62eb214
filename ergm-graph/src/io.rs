//! Arc-list and attribute file input/output.
//!
//! The arc list is a Pajek-style file: a `*vertices N` line, an `*arcs`
//! marker, then one whitespace-separated 1-based `i j` pair per line.
//! Attribute files carry a header row of column names followed by one row
//! per node; `NA` marks missing data. Files ending in `.gz` are read and
//! written through gzip transparently.

use crate::digraph::Digraph;
use anyhow::{anyhow, Context};
use fnv::FnvHashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Open a file for reading, gunzipping if the name ends in `.gz`.
pub fn open_buf_reader(input_file: &str) -> anyhow::Result<Box<dyn BufRead>> {
    let ext = Path::new(input_file).extension().and_then(|x| x.to_str());
    let file = File::open(input_file).with_context(|| format!("opening {}", input_file))?;
    match ext {
        Some("gz") => {
            let decoder = flate2::read::GzDecoder::new(file);
            Ok(Box::new(BufReader::new(decoder)))
        }
        _ => Ok(Box::new(BufReader::new(file))),
    }
}

/// Open a file for writing, gzipping if the name ends in `.gz`.
pub fn open_buf_writer(output_file: &str) -> anyhow::Result<Box<dyn Write>> {
    let ext = Path::new(output_file).extension().and_then(|x| x.to_str());
    let file = File::create(output_file).with_context(|| format!("creating {}", output_file))?;
    match ext {
        Some("gz") => {
            let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
            Ok(Box::new(BufWriter::new(encoder)))
        }
        _ => Ok(Box::new(BufWriter::new(file))),
    }
}

fn data_lines(input_file: &str) -> anyhow::Result<Vec<String>> {
    let buf = open_buf_reader(input_file)?;
    let mut lines = vec![];
    for line in buf.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('%') {
            continue;
        }
        lines.push(trimmed.to_owned());
    }
    Ok(lines)
}

/// Load a digraph from a Pajek-style arc list.
pub fn load_arclist(input_file: &str) -> anyhow::Result<Digraph> {
    let lines = data_lines(input_file)?;
    let mut iter = lines.iter();

    let header = iter
        .next()
        .ok_or_else(|| anyhow!("{}: empty arc list file", input_file))?;
    let mut words = header.split_whitespace();
    let tag = words.next().unwrap_or("");
    if !tag.eq_ignore_ascii_case("*vertices") {
        return Err(anyhow!("{}: expected *vertices, found {}", input_file, tag));
    }
    let num_nodes: usize = words
        .next()
        .ok_or_else(|| anyhow!("{}: *vertices without a count", input_file))?
        .parse()
        .with_context(|| format!("{}: bad vertex count", input_file))?;

    let mut g = Digraph::new(num_nodes);
    for line in iter {
        if line.starts_with('*') {
            // *arcs / *edges section marker
            continue;
        }
        let mut words = line.split_whitespace();
        let i: usize = words
            .next()
            .ok_or_else(|| anyhow!("{}: missing arc tail", input_file))?
            .parse()?;
        let j: usize = words
            .next()
            .ok_or_else(|| anyhow!("{}: missing arc head", input_file))?
            .parse()?;
        if i < 1 || i > num_nodes || j < 1 || j > num_nodes {
            return Err(anyhow!("{}: arc {} -> {} out of range", input_file, i, j));
        }
        // arc lists are 1-based
        let (i, j) = ((i - 1) as u32, (j - 1) as u32);
        if !g.is_arc(i, j) {
            g.insert_arc(i, j);
        }
    }
    Ok(g)
}

/// Write the graph's arc set as a Pajek-style arc list.
pub fn write_arclist(g: &Digraph, output_file: &str) -> anyhow::Result<()> {
    let mut buf = open_buf_writer(output_file)?;
    writeln!(buf, "*vertices {}", g.num_nodes())?;
    writeln!(buf, "*arcs")?;
    for arc in g.arcs() {
        writeln!(buf, "{} {}", arc.tail + 1, arc.head + 1)?;
    }
    buf.flush()?;
    Ok(())
}

fn attribute_rows(
    input_file: &str,
    num_nodes: usize,
) -> anyhow::Result<(Vec<String>, Vec<Vec<String>>)> {
    let lines = data_lines(input_file)?;
    let mut iter = lines.into_iter();
    let names: Vec<String> = iter
        .next()
        .ok_or_else(|| anyhow!("{}: empty attribute file", input_file))?
        .split_whitespace()
        .map(|s| s.to_owned())
        .collect();
    let rows: Vec<Vec<String>> = iter
        .map(|l| l.split_whitespace().map(|s| s.to_owned()).collect())
        .collect();
    if rows.len() != num_nodes {
        return Err(anyhow!(
            "{}: {} attribute rows for {} nodes",
            input_file,
            rows.len(),
            num_nodes
        ));
    }
    for row in &rows {
        if row.len() != names.len() {
            return Err(anyhow!(
                "{}: row with {} values for {} columns",
                input_file,
                row.len(),
                names.len()
            ));
        }
    }
    Ok((names, rows))
}

/// Load binary attributes (values `0`, `1` or `NA`) into the graph.
pub fn load_binary_attributes(g: &mut Digraph, input_file: &str) -> anyhow::Result<()> {
    let (names, rows) = attribute_rows(input_file, g.num_nodes())?;
    for (a, name) in names.iter().enumerate() {
        let mut col = Vec::with_capacity(rows.len());
        for row in &rows {
            col.push(match row[a].as_str() {
                "NA" => None,
                "0" => Some(false),
                "1" => Some(true),
                other => {
                    return Err(anyhow!(
                        "{}: bad binary value {:?} in column {}",
                        input_file,
                        other,
                        name
                    ))
                }
            });
        }
        g.attrs.add_binary(name, col);
    }
    Ok(())
}

/// Load categorical attributes (non-negative integer codes or `NA`).
pub fn load_categorical_attributes(g: &mut Digraph, input_file: &str) -> anyhow::Result<()> {
    let (names, rows) = attribute_rows(input_file, g.num_nodes())?;
    for (a, name) in names.iter().enumerate() {
        let mut col = Vec::with_capacity(rows.len());
        for row in &rows {
            col.push(match row[a].as_str() {
                "NA" => None,
                v => Some(v.parse::<u32>().with_context(|| {
                    format!("{}: bad categorical value in column {}", input_file, name)
                })?),
            });
        }
        g.attrs.add_categorical(name, col);
    }
    Ok(())
}

/// Load continuous attributes (floats or `NA`, stored as NaN).
pub fn load_continuous_attributes(g: &mut Digraph, input_file: &str) -> anyhow::Result<()> {
    let (names, rows) = attribute_rows(input_file, g.num_nodes())?;
    for (a, name) in names.iter().enumerate() {
        let mut col = Vec::with_capacity(rows.len());
        for row in &rows {
            col.push(match row[a].as_str() {
                "NA" => f64::NAN,
                v => v.parse::<f64>().with_context(|| {
                    format!("{}: bad continuous value in column {}", input_file, name)
                })?,
            });
        }
        g.attrs.add_continuous(name, col);
    }
    // remember coordinate columns for the dyadic distance covariates
    g.attrs.latitude_index = g.attrs.find_continuous("latitude");
    g.attrs.longitude_index = g.attrs.find_continuous("longitude");
    g.attrs.x_index = g.attrs.find_continuous("x");
    g.attrs.y_index = g.attrs.find_continuous("y");
    Ok(())
}

/// Load set-valued attributes: comma-separated category codes per cell,
/// `none` for the empty set, `NA` for missing.
pub fn load_set_attributes(g: &mut Digraph, input_file: &str) -> anyhow::Result<()> {
    let (names, rows) = attribute_rows(input_file, g.num_nodes())?;
    for (a, name) in names.iter().enumerate() {
        let mut col = Vec::with_capacity(rows.len());
        for row in &rows {
            col.push(match row[a].as_str() {
                "NA" => None,
                "none" => Some(FnvHashSet::default()),
                v => {
                    let mut set = FnvHashSet::default();
                    for item in v.split(',') {
                        set.insert(item.parse::<u32>().with_context(|| {
                            format!("{}: bad set value in column {}", input_file, name)
                        })?);
                    }
                    Some(set)
                }
            });
        }
        g.attrs.add_set(name, col);
    }
    Ok(())
}

fn single_column(input_file: &str, num_nodes: usize) -> anyhow::Result<Vec<u32>> {
    let lines = data_lines(input_file)?;
    let mut values = Vec::with_capacity(num_nodes);
    for line in &lines {
        let word = line.split_whitespace().next().unwrap_or("");
        if values.is_empty() && word.parse::<u32>().is_err() {
            continue; // header line
        }
        values.push(
            word.parse::<u32>()
                .with_context(|| format!("{}: bad value {:?}", input_file, word))?,
        );
    }
    if values.len() != num_nodes {
        return Err(anyhow!(
            "{}: {} values for {} nodes",
            input_file,
            values.len(),
            num_nodes
        ));
    }
    Ok(values)
}

/// Load snowball zones (one wave number per node) and attach them.
pub fn load_zones(g: &mut Digraph, input_file: &str) -> anyhow::Result<()> {
    let zones = single_column(input_file, g.num_nodes())?;
    g.attach_snowball(zones)
}

/// Load citation terms (one time period per node) and attach them.
pub fn load_terms(g: &mut Digraph, input_file: &str) -> anyhow::Result<()> {
    let terms = single_column(input_file, g.num_nodes())?;
    g.attach_citation(terms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn test_arclist_roundtrip() {
        let f = write_temp("*vertices 4\n*arcs\n1 2\n2 3\n4 1\n");
        let g = load_arclist(f.path().to_str().unwrap()).unwrap();
        assert_eq!(g.num_nodes(), 4);
        assert_eq!(g.num_arcs(), 3);
        assert!(g.is_arc(0, 1));
        assert!(g.is_arc(3, 0));

        let out = tempfile::NamedTempFile::new().unwrap();
        write_arclist(&g, out.path().to_str().unwrap()).unwrap();
        let g2 = load_arclist(out.path().to_str().unwrap()).unwrap();
        assert_eq!(g2.num_arcs(), 3);
        assert!(g2.is_arc(1, 2));
    }

    #[test]
    fn test_bad_arclist() {
        let f = write_temp("*vertices 2\n*arcs\n1 5\n");
        assert!(load_arclist(f.path().to_str().unwrap()).is_err());
        let f = write_temp("2\n1 2\n");
        assert!(load_arclist(f.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn test_attribute_files() {
        let arcs = write_temp("*vertices 3\n*arcs\n1 2\n");
        let mut g = load_arclist(arcs.path().to_str().unwrap()).unwrap();

        let bin = write_temp("gender member\n0 1\n1 NA\nNA 0\n");
        load_binary_attributes(&mut g, bin.path().to_str().unwrap()).unwrap();
        assert_eq!(g.attrs.binary_value(0, 0), Some(false));
        assert_eq!(g.attrs.binary_value(1, 1), None);

        let cont = write_temp("age\n1.5\nNA\n-2.0\n");
        load_continuous_attributes(&mut g, cont.path().to_str().unwrap()).unwrap();
        assert!(g.attrs.continuous_value(0, 1).is_nan());
        assert_eq!(g.attrs.continuous_value(0, 2), -2.0);

        let set = write_temp("skills\n1,2\nnone\nNA\n");
        load_set_attributes(&mut g, set.path().to_str().unwrap()).unwrap();
        assert_eq!(g.attrs.set_value(0, 0).unwrap().len(), 2);
        assert_eq!(g.attrs.set_value(0, 1).unwrap().len(), 0);
        assert!(g.attrs.set_value(0, 2).is_none());
    }

    #[test]
    fn test_zone_file() {
        let arcs = write_temp("*vertices 3\n*arcs\n1 2\n2 3\n");
        let mut g = load_arclist(arcs.path().to_str().unwrap()).unwrap();
        let zones = write_temp("zone\n0\n1\n2\n");
        load_zones(&mut g, zones.path().to_str().unwrap()).unwrap();
        assert_eq!(g.snowball().unwrap().max_zone, 2);
        assert_eq!(g.snowball().unwrap().num_inner_nodes(), 2);
    }
}
