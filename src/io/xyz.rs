// src/io/xyz.rs
//
// Extended XYZ reader/writer. A file holds any number of frames:
//
//   <n_atoms>
//   Lattice="ax ay az bx by bz cx cy cz" Properties=species:S:1:pos:R:3:... key=value ...
//   <species> <x> <y> <z> <extra columns...>
//
// Plain XYZ (no key=value comment) is read as species + positions only.

use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};

use crate::model::{Annotations, Atom, AtomArray, InfoValue, Structure};

pub fn parse(path: &str) -> io::Result<Vec<Structure>> {
    let text = fs::read_to_string(path)?;
    parse_str(&text)
}

pub fn parse_str(text: &str) -> io::Result<Vec<Structure>> {
    let lines: Vec<&str> = text.lines().collect();
    let mut frames = Vec::new();
    let mut cursor = 0;

    while cursor < lines.len() {
        // Blank lines between frames are tolerated
        if lines[cursor].trim().is_empty() {
            cursor += 1;
            continue;
        }

        let frame_no = frames.len();
        let n_atoms: usize = lines[cursor].trim().parse().map_err(|_| {
            invalid(format!(
                "frame {}: invalid atom count '{}' on line {}",
                frame_no,
                lines[cursor].trim(),
                cursor + 1
            ))
        })?;

        let comment = lines.get(cursor + 1).copied().unwrap_or("");
        let header = Header::parse(comment)
            .map_err(|e| invalid(format!("frame {}: {}", frame_no, e)))?;

        let first = cursor + 2;
        let end = first
            .checked_add(n_atoms)
            .filter(|&end| end <= lines.len())
            .ok_or_else(|| {
                invalid(format!(
                    "frame {}: expected {} atom lines, file ends after {}",
                    frame_no,
                    n_atoms,
                    lines.len().saturating_sub(first)
                ))
            })?;

        let structure = header
            .read_atoms(&lines[first..end], first + 1)
            .map_err(|e| invalid(format!("frame {}: {}", frame_no, e)))?;
        frames.push(structure);
        cursor = end;
    }

    if frames.is_empty() {
        return Err(invalid("Empty XYZ file"));
    }
    Ok(frames)
}

pub fn write(path: &str, structures: &[Structure]) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(to_string(structures).as_bytes())?;
    writer.flush()
}

pub fn to_string(structures: &[Structure]) -> String {
    let mut out = String::new();
    for s in structures {
        let _ = writeln!(out, "{}", s.atoms.len());
        out.push_str(&comment_line(s));
        out.push('\n');

        for (i, atom) in s.atoms.iter().enumerate() {
            let _ = write!(
                out,
                "{:<3} {:16.8} {:16.8} {:16.8}",
                atom.element, atom.position[0], atom.position[1], atom.position[2]
            );
            for (_, array) in s.arrays.iter() {
                match array {
                    AtomArray::Text(v) => {
                        let _ = write!(out, " {}", v.get(i).map_or("", String::as_str));
                    }
                    numeric => {
                        for value in numeric.row(i).unwrap_or(&[]) {
                            let _ = write!(out, " {:16.8}", value);
                        }
                    }
                }
            }
            out.push('\n');
        }
    }
    out
}

// --- Comment line ---

#[derive(Debug, Clone, Copy, PartialEq)]
enum ColumnKind {
    Real,
    Integer,
    Logical,
    Text,
}

#[derive(Debug, Clone, PartialEq)]
struct PropertyColumn {
    name: String,
    kind: ColumnKind,
    count: usize,
}

#[derive(Debug)]
struct Header {
    lattice: Option<[[f64; 3]; 3]>,
    pbc: Option<[bool; 3]>,
    properties: Vec<PropertyColumn>,
    info: Annotations<InfoValue>,
}

impl Header {
    fn parse(comment: &str) -> Result<Self, String> {
        let mut header = Header {
            lattice: None,
            pbc: None,
            properties: default_properties(),
            info: Annotations::new(),
        };

        for (key, value) in split_key_values(comment) {
            match key.to_ascii_lowercase().as_str() {
                "lattice" => {
                    let parts: Vec<f64> = value
                        .split_whitespace()
                        .map(|s| s.parse::<f64>())
                        .collect::<Result<_, _>>()
                        .map_err(|_| format!("invalid Lattice \"{}\"", value))?;
                    if parts.len() != 9 {
                        return Err(format!("Lattice needs 9 numbers, got {}", parts.len()));
                    }
                    header.lattice = Some([
                        [parts[0], parts[1], parts[2]],
                        [parts[3], parts[4], parts[5]],
                        [parts[6], parts[7], parts[8]],
                    ]);
                }
                "pbc" => {
                    let flags: Vec<bool> = value
                        .split_whitespace()
                        .map(parse_bool)
                        .collect::<Option<_>>()
                        .ok_or_else(|| format!("invalid pbc \"{}\"", value))?;
                    if flags.len() != 3 {
                        return Err(format!("pbc needs 3 flags, got {}", flags.len()));
                    }
                    header.pbc = Some([flags[0], flags[1], flags[2]]);
                }
                "properties" => header.properties = parse_properties(&value)?,
                _ => header.info.insert(key, parse_info_value(&value)),
            }
        }

        Ok(header)
    }

    fn read_atoms(&self, lines: &[&str], first_line_no: usize) -> Result<Structure, String> {
        let width: usize = self.properties.iter().map(|p| p.count).sum();
        let n = lines.len();

        let mut elements = Vec::with_capacity(n);
        let mut positions = Vec::with_capacity(n);
        // One buffer per extra property column, filled row by row
        let mut numeric: Vec<Vec<f64>> = vec![Vec::new(); self.properties.len()];
        let mut text: Vec<Vec<String>> = vec![Vec::new(); self.properties.len()];

        for (row, line) in lines.iter().enumerate() {
            let parts: Vec<&str> = line.split_whitespace().collect();
            let line_no = first_line_no + row;
            if parts.len() < width {
                return Err(format!(
                    "line {}: expected {} columns, found {}",
                    line_no,
                    width,
                    parts.len()
                ));
            }

            let mut col = 0;
            for (p_idx, prop) in self.properties.iter().enumerate() {
                let fields = &parts[col..col + prop.count];
                col += prop.count;

                match (prop.name.as_str(), prop.kind) {
                    ("species", _) => elements.push(fields[0].to_string()),
                    ("pos", _) => {
                        let mut p = [0.0; 3];
                        for (k, f) in fields.iter().enumerate() {
                            p[k] = f
                                .parse()
                                .map_err(|_| format!("line {}: invalid coordinate '{}'", line_no, f))?;
                        }
                        positions.push(p);
                    }
                    (_, ColumnKind::Text) => text[p_idx].push(fields.join(" ")),
                    (_, ColumnKind::Logical) => {
                        for f in fields {
                            let b = parse_bool(f).ok_or_else(|| {
                                format!("line {}: invalid logical '{}' for {}", line_no, f, prop.name)
                            })?;
                            numeric[p_idx].push(if b { 1.0 } else { 0.0 });
                        }
                    }
                    (_, ColumnKind::Real | ColumnKind::Integer) => {
                        for f in fields {
                            let v: f64 = f.parse().map_err(|_| {
                                format!("line {}: invalid value '{}' for {}", line_no, f, prop.name)
                            })?;
                            numeric[p_idx].push(v);
                        }
                    }
                }
            }
        }

        let atoms = elements
            .into_iter()
            .zip(positions)
            .enumerate()
            .map(|(i, (el, pos))| Atom::new(el, pos, i))
            .collect();

        let lattice = self.lattice.unwrap_or([[0.0; 3]; 3]);
        // A cell without explicit pbc is periodic in all directions
        let pbc = self.pbc.unwrap_or([self.lattice.is_some(); 3]);

        let mut structure = Structure::new(atoms, lattice, pbc);
        structure.info = self.info.clone();

        for (p_idx, prop) in self.properties.iter().enumerate() {
            if prop.name == "species" || prop.name == "pos" {
                continue;
            }
            let array = match prop.kind {
                ColumnKind::Text => AtomArray::Text(std::mem::take(&mut text[p_idx])),
                _ if prop.count == 1 => AtomArray::Scalar(std::mem::take(&mut numeric[p_idx])),
                _ => AtomArray::Vector {
                    arity: prop.count,
                    values: std::mem::take(&mut numeric[p_idx]),
                },
            };
            structure.arrays.insert(prop.name.clone(), array);
        }

        Ok(structure)
    }
}

fn default_properties() -> Vec<PropertyColumn> {
    vec![
        PropertyColumn { name: "species".into(), kind: ColumnKind::Text, count: 1 },
        PropertyColumn { name: "pos".into(), kind: ColumnKind::Real, count: 3 },
    ]
}

fn parse_properties(value: &str) -> Result<Vec<PropertyColumn>, String> {
    let fields: Vec<&str> = value.split(':').collect();
    if fields.len() % 3 != 0 {
        return Err(format!("malformed Properties \"{}\"", value));
    }

    let mut columns = Vec::new();
    for chunk in fields.chunks(3) {
        let kind = match chunk[1].to_ascii_uppercase().as_str() {
            "R" => ColumnKind::Real,
            "I" => ColumnKind::Integer,
            "L" => ColumnKind::Logical,
            "S" => ColumnKind::Text,
            other => return Err(format!("unknown property type '{}' for {}", other, chunk[0])),
        };
        let count: usize = chunk[2]
            .parse()
            .map_err(|_| format!("invalid column count '{}' for {}", chunk[2], chunk[0]))?;
        if count == 0 {
            return Err(format!("property {} has zero columns", chunk[0]));
        }
        columns.push(PropertyColumn { name: chunk[0].to_string(), kind, count });
    }

    let has = |name: &str| columns.iter().any(|c| c.name == name);
    if !has("species") {
        return Err("Properties must contain species".into());
    }
    if !columns.iter().any(|c| c.name == "pos" && c.count == 3) {
        return Err("Properties must contain pos:R:3".into());
    }
    Ok(columns)
}

/// Splits `key=value key2="quoted value" flag` into pairs. Bare words
/// become boolean flags set to "T".
fn split_key_values(line: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        if chars.peek().is_none() {
            break;
        }

        let mut key = String::new();
        while let Some(&c) = chars.peek() {
            if c == '=' || c.is_whitespace() {
                break;
            }
            key.push(c);
            chars.next();
        }

        if chars.peek() != Some(&'=') {
            pairs.push((key, "T".to_string()));
            continue;
        }
        chars.next(); // '='

        let mut value = String::new();
        if chars.peek() == Some(&'"') {
            chars.next();
            for c in chars.by_ref() {
                if c == '"' {
                    break;
                }
                value.push(c);
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                value.push(c);
                chars.next();
            }
        }
        pairs.push((key, value));
    }

    pairs
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "T" | "True" | "true" | "TRUE" => Some(true),
        "F" | "False" | "false" | "FALSE" => Some(false),
        _ => None,
    }
}

fn parse_info_value(value: &str) -> InfoValue {
    if let Some(b) = parse_bool(value.trim()) {
        return InfoValue::Scalar(if b { 1.0 } else { 0.0 });
    }

    let numbers: Result<Vec<f64>, _> = value.split_whitespace().map(str::parse::<f64>).collect();
    match numbers {
        Ok(v) if v.len() == 1 => InfoValue::Scalar(v[0]),
        Ok(v) if !v.is_empty() => InfoValue::Vector(v),
        _ => InfoValue::Text(value.to_string()),
    }
}

fn comment_line(s: &Structure) -> String {
    let mut parts = Vec::new();

    if s.lattice.iter().flatten().any(|&x| x != 0.0) {
        let flat: Vec<String> = s.lattice.iter().flatten().map(|x| format!("{:.8}", x)).collect();
        parts.push(format!("Lattice=\"{}\"", flat.join(" ")));
    }

    let mut props = String::from("species:S:1:pos:R:3");
    for (key, array) in s.arrays.iter() {
        let spec = match array {
            AtomArray::Scalar(_) => format!(":{}:R:1", key),
            AtomArray::Vector { arity, .. } => format!(":{}:R:{}", key, arity),
            AtomArray::Text(_) => format!(":{}:S:1", key),
        };
        props.push_str(&spec);
    }
    parts.push(format!("Properties={}", props));

    for (key, value) in s.info.iter() {
        let rendered = match value {
            InfoValue::Scalar(x) => format!("{}", x),
            InfoValue::Vector(v) => {
                let items: Vec<String> = v.iter().map(|x| x.to_string()).collect();
                format!("\"{}\"", items.join(" "))
            }
            InfoValue::Text(t) if t.contains(char::is_whitespace) || t.is_empty() => {
                format!("\"{}\"", t)
            }
            InfoValue::Text(t) => t.clone(),
        };
        parts.push(format!("{}={}", key, rendered));
    }

    let flags: Vec<&str> = s.pbc.iter().map(|&b| if b { "T" } else { "F" }).collect();
    parts.push(format!("pbc=\"{}\"", flags.join(" ")));

    parts.join(" ")
}

fn invalid(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_FRAMES: &str = "\
3
Lattice=\"5.0 0.0 0.0 0.0 5.0 0.0 0.0 0.0 5.0\" Properties=species:S:1:pos:R:3:soap:R:2:charge:R:1 energy=-12.5 pca_coord=\"0.1 0.2\" config_type=bulk
O 0.0 0.0 0.0 1.0 2.0 -0.8
H 0.96 0.0 0.0 3.0 4.0 0.4
H -0.24 0.93 0.0 5.0 6.0 0.4
2
Properties=species:S:1:pos:R:3:soap:R:2:charge:R:1 energy=-3.25 pca_coord=\"0.3 0.4\" config_type=\"gas phase\"
H 0.0 0.0 0.0 7.0 8.0 0.0
H 0.74 0.0 0.0 9.0 10.0 0.0
";

    #[test]
    fn test_parse_extended_frames() {
        let frames = parse_str(TWO_FRAMES).unwrap();
        assert_eq!(frames.len(), 2);

        let first = &frames[0];
        assert_eq!(first.len(), 3);
        assert_eq!(first.atoms[1].element, "H");
        assert!((first.atoms[2].position[1] - 0.93).abs() < 1e-12);
        assert!(first.is_3d_periodic());
        assert_eq!(first.pbc, [true; 3]);

        assert_eq!(first.info.get("energy"), Some(&InfoValue::Scalar(-12.5)));
        assert_eq!(first.info.get("pca_coord"), Some(&InfoValue::Vector(vec![0.1, 0.2])));
        assert_eq!(first.info.get("config_type"), Some(&InfoValue::Text("bulk".into())));

        let soap = first.arrays.get("soap").unwrap();
        assert_eq!(soap.row(2), Some(&[5.0, 6.0][..]));
        assert_eq!(first.arrays.get("charge").unwrap().row(0), Some(&[-0.8][..]));

        let second = &frames[1];
        assert!(!second.is_3d_periodic());
        assert_eq!(second.pbc, [false; 3]);
        assert_eq!(
            second.info.get("config_type"),
            Some(&InfoValue::Text("gas phase".into()))
        );
    }

    #[test]
    fn test_plain_xyz() {
        let frames = parse_str("2\nhydrogen molecule\nH 0 0 0\nH 0 0 0.74\n").unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].len(), 2);
        // "hydrogen" and "molecule" are bare flags
        assert_eq!(frames[0].info.get("hydrogen"), Some(&InfoValue::Scalar(1.0)));
        assert!(frames[0].arrays.is_empty());
    }

    #[test]
    fn test_truncated_frame_is_an_error() {
        let err = parse_str("3\n\nO 0 0 0\nH 1 0 0\n").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("frame 0"));
    }

    #[test]
    fn test_huge_atom_count_is_an_error() {
        let err = parse_str("18446744073709551615\n\nH 0 0 0\n").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("expected 18446744073709551615 atom lines"));
    }

    #[test]
    fn test_short_text_array_does_not_panic_on_write() {
        let mut s = Structure::new(
            vec![Atom::new("O", [0.0; 3], 0), Atom::new("H", [1.0, 0.0, 0.0], 1)],
            [[0.0; 3]; 3],
            [false; 3],
        );
        s.arrays.insert("label", AtomArray::Text(vec!["a".to_string()]));
        let text = to_string(&[s]);
        assert_eq!(text.lines().count(), 4);
        assert!(text.lines().nth(2).unwrap().ends_with(" a"));
    }

    #[test]
    fn test_bad_values_are_errors() {
        assert!(parse_str("1\n\nO 0 x 0\n").is_err());
        assert!(parse_str("one\n\nO 0 0 0\n").is_err());
        assert!(parse_str("1\nLattice=\"1 2 3\"\nO 0 0 0\n").is_err());
        assert!(parse_str("").is_err());
    }

    #[test]
    fn test_write_then_read_keeps_annotations() {
        let frames = parse_str(TWO_FRAMES).unwrap();
        let text = to_string(&frames);
        let again = parse_str(&text).unwrap();

        assert_eq!(again.len(), 2);
        assert_eq!(again[0].info.get("energy"), frames[0].info.get("energy"));
        assert_eq!(again[1].info.get("config_type"), frames[1].info.get("config_type"));
        assert_eq!(again[0].arrays.get("soap"), frames[0].arrays.get("soap"));
        assert_eq!(again[0].lattice, frames[0].lattice);
        assert_eq!(again[1].pbc, [false; 3]);
    }

    #[test]
    fn test_split_key_values() {
        let pairs = split_key_values("a=1 b=\"x y\"  flag c=z");
        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "x y".to_string()),
                ("flag".to_string(), "T".to_string()),
                ("c".to_string(), "z".to_string()),
            ]
        );
    }
}
