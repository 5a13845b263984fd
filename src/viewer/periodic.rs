// src/viewer/periodic.rs
//
// Periodic repetition of a structure for display, e.g. "(0,2) (0,1) (-1,1)"
// tiles the cell twice along a and twice along c starting one cell below
// the origin.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::{AtomArray, Structure};
use crate::utils::linalg::{add, frac_to_cart};

/// Upper bound on the number of images one repetition may produce.
pub const MAX_IMAGES: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepetitionSpec {
    /// Half-open ranges of image indices along a, b, c.
    pub ranges: [(i32, i32); 3],
}

impl Default for RepetitionSpec {
    fn default() -> Self {
        Self { ranges: [(0, 1); 3] }
    }
}

impl RepetitionSpec {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Number of images along each axis.
    pub fn multiplicity(&self) -> [u32; 3] {
        let m = |(lo, hi): (i32, i32)| (i64::from(hi) - i64::from(lo)).clamp(0, u32::MAX as i64) as u32;
        [m(self.ranges[0]), m(self.ranges[1]), m(self.ranges[2])]
    }

    /// Total number of images, `None` on overflow.
    pub fn image_count(&self) -> Option<u64> {
        self.multiplicity()
            .iter()
            .try_fold(1u64, |acc, &m| acc.checked_mul(u64::from(m)))
    }

    pub fn origin(&self) -> [f64; 3] {
        [
            self.ranges[0].0 as f64,
            self.ranges[1].0 as f64,
            self.ranges[2].0 as f64,
        ]
    }
}

impl FromStr for RepetitionSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let groups: Vec<&str> = s.split_whitespace().collect();
        if groups.len() != 3 {
            return Err(format!(
                "expected three ranges like '(0,1) (0,1) (0,1)', got '{}'",
                s.trim()
            ));
        }

        let mut ranges = [(0, 1); 3];
        for (axis, group) in groups.iter().enumerate() {
            let inner = group
                .strip_prefix('(')
                .and_then(|g| g.strip_suffix(')'))
                .ok_or_else(|| format!("range '{}' is not of the form (start,end)", group))?;

            let bounds: Vec<i32> = inner
                .split(',')
                .map(|v| v.trim().parse::<i32>())
                .collect::<Result<_, _>>()
                .map_err(|e| format!("range '{}': {}", group, e))?;

            match bounds.as_slice() {
                [lo, hi] if hi > lo => ranges[axis] = (*lo, *hi),
                [_, _] => return Err(format!("range '{}' is empty", group)),
                _ => return Err(format!("range '{}' needs two bounds", group)),
            }
        }

        let parsed = Self { ranges };
        match parsed.image_count() {
            Some(n) if n <= MAX_IMAGES => Ok(parsed),
            _ => Err(format!(
                "'{}' asks for more than {} images",
                s.trim(),
                MAX_IMAGES
            )),
        }
    }
}

impl fmt::Display for RepetitionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.ranges;
        write!(f, "({},{}) ({},{}) ({},{})", a.0, a.1, b.0, b.1, c.0, c.1)
    }
}

/// Tiles the unit cell of `structure` according to `spec`.
///
/// Images are emitted with a outermost and c innermost; each image holds
/// the atoms in their original order. The whole block is then shifted to
/// start at image `(x0, y0, z0)`. The lattice stays the unit cell.
/// Non-periodic structures, the default spec and specs above
/// [`MAX_IMAGES`] are returned unchanged.
pub fn replicate(structure: &Structure, spec: &RepetitionSpec) -> Structure {
    if spec.is_default() || !structure.is_3d_periodic() {
        return structure.clone();
    }
    let images = match spec.image_count() {
        Some(n) if n <= MAX_IMAGES => n as usize,
        _ => {
            log::warn!("Repetition {} exceeds {} images, showing the unit cell", spec, MAX_IMAGES);
            return structure.clone();
        }
    };

    let [nx, ny, nz] = spec.multiplicity();
    let shift = frac_to_cart(spec.origin(), structure.lattice);
    let mut new_atoms = Vec::with_capacity(structure.len().saturating_mul(images));

    for x in 0..nx {
        for y in 0..ny {
            for z in 0..nz {
                let translation = add(
                    frac_to_cart([x as f64, y as f64, z as f64], structure.lattice),
                    shift,
                );

                for atom in &structure.atoms {
                    let mut image = atom.clone();
                    image.position = add(atom.position, translation);
                    new_atoms.push(image);
                }
            }
        }
    }

    log::debug!(
        "Replicated {} atoms into {} ({}x{}x{}, start {:?})",
        structure.len(),
        new_atoms.len(),
        nx,
        ny,
        nz,
        spec.origin()
    );

    let mut out = Structure::new(new_atoms, structure.lattice, structure.pbc);
    out.info = structure.info.clone();

    // Per-atom arrays follow their atoms into every image
    let indices: Vec<usize> = (0..images).flat_map(|_| 0..structure.len()).collect();
    for (key, array) in structure.arrays.iter() {
        out.arrays.insert(key, array.select(&indices));
    }
    out
}

/// Replicated structure whose lattice spans the whole block, so it is a
/// valid periodic cell on its own. Each atom records the unit-cell atom it
/// was copied from in the `unit_cell_index` array.
pub fn supercell(structure: &Structure, spec: &RepetitionSpec) -> Structure {
    let mut out = replicate(structure, spec);
    let repeated = structure.is_3d_periodic()
        && !spec.is_default()
        && spec.image_count().is_some_and(|n| n <= MAX_IMAGES);
    if !repeated {
        return out;
    }

    for (axis, m) in spec.multiplicity().iter().enumerate() {
        for k in 0..3 {
            out.lattice[axis][k] *= *m as f64;
        }
    }
    let sources = out.atoms.iter().map(|a| a.original_index as f64).collect();
    out.arrays.insert("unit_cell_index", AtomArray::Scalar(sources));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Atom;

    fn cubic(a: f64) -> Structure {
        Structure::new(
            vec![
                Atom::new("Na", [0.0, 0.0, 0.0], 0),
                Atom::new("Cl", [a / 2.0, a / 2.0, a / 2.0], 1),
            ],
            [[a, 0.0, 0.0], [0.0, a, 0.0], [0.0, 0.0, a]],
            [true; 3],
        )
    }

    #[test]
    fn test_parse() {
        let spec: RepetitionSpec = "(0,2) (0,1) (-1,1)".parse().unwrap();
        assert_eq!(spec.ranges, [(0, 2), (0, 1), (-1, 1)]);
        assert_eq!(spec.multiplicity(), [2, 1, 2]);
        assert_eq!(spec.to_string(), "(0,2) (0,1) (-1,1)");

        let spaced: RepetitionSpec = "  (0, 1)   (0,1) (0,1) ".parse().unwrap();
        assert!(spaced.is_default());

        assert!("(0,1) (0,1)".parse::<RepetitionSpec>().is_err());
        assert!("(1,1) (0,1) (0,1)".parse::<RepetitionSpec>().is_err());
        assert!("(2,1) (0,1) (0,1)".parse::<RepetitionSpec>().is_err());
        assert!("(0,a) (0,1) (0,1)".parse::<RepetitionSpec>().is_err());
        assert!("0,1 (0,1) (0,1)".parse::<RepetitionSpec>().is_err());
        assert!("(0,1,2) (0,1) (0,1)".parse::<RepetitionSpec>().is_err());
    }

    #[test]
    fn test_oversized_repetition_is_rejected() {
        assert!("(-2000000000,2000000000) (0,1) (0,1)".parse::<RepetitionSpec>().is_err());
        assert!("(0,100000) (0,100000) (0,1)".parse::<RepetitionSpec>().is_err());
        assert!("(0,1000) (0,1000) (0,1000)".parse::<RepetitionSpec>().is_err());
        assert!("(0,100) (0,100) (0,1)".parse::<RepetitionSpec>().is_ok());

        // Built directly, bypassing the parser
        let huge = RepetitionSpec { ranges: [(i32::MIN, i32::MAX); 3] };
        assert_eq!(huge.multiplicity(), [u32::MAX; 3]);
        assert_eq!(huge.image_count(), None);
        let s = cubic(5.0);
        assert_eq!(replicate(&s, &huge), s);
    }

    #[test]
    fn test_default_is_identity() {
        let s = cubic(5.0);
        assert_eq!(replicate(&s, &RepetitionSpec::default()), s);
    }

    #[test]
    fn test_non_periodic_is_identity() {
        let mut s = cubic(5.0);
        s.lattice = [[0.0; 3]; 3];
        let spec: RepetitionSpec = "(0,3) (0,3) (0,3)".parse().unwrap();
        assert_eq!(replicate(&s, &spec).len(), 2);
    }

    #[test]
    fn test_doubling_along_a() {
        let mut s = cubic(5.0);
        s.arrays.insert("charge", AtomArray::Scalar(vec![1.0, -1.0]));
        let spec: RepetitionSpec = "(0,2) (0,1) (0,1)".parse().unwrap();
        let out = replicate(&s, &spec);

        assert_eq!(out.len(), 4);
        assert_eq!(out.lattice, s.lattice);
        assert_eq!(out.atoms[0].position, [0.0, 0.0, 0.0]);
        assert_eq!(out.atoms[1].element, "Cl");
        assert_eq!(out.atoms[2].position, [5.0, 0.0, 0.0]);
        assert_eq!(out.atoms[3].position, [7.5, 2.5, 2.5]);
        assert_eq!(out.atoms[3].original_index, 1);
        assert_eq!(out.arrays.get("charge"), Some(&AtomArray::Scalar(vec![1.0, -1.0, 1.0, -1.0])));
        assert!(out.validate().is_ok());
    }

    #[test]
    fn test_negative_start_shifts_block() {
        let s = cubic(4.0);
        let spec: RepetitionSpec = "(0,1) (0,1) (-1,1)".parse().unwrap();
        let out = replicate(&s, &spec);

        assert_eq!(out.len(), 4);
        // c innermost: image z=0 then z=1, shifted by -c
        assert_eq!(out.atoms[0].position, [0.0, 0.0, -4.0]);
        assert_eq!(out.atoms[2].position, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_supercell_scales_lattice_and_records_sources() {
        let s = cubic(5.0);
        let spec: RepetitionSpec = "(0,2) (0,1) (0,3)".parse().unwrap();
        let out = supercell(&s, &spec);

        assert_eq!(out.len(), 12);
        assert_eq!(out.lattice, [[10.0, 0.0, 0.0], [0.0, 5.0, 0.0], [0.0, 0.0, 15.0]]);
        assert_eq!(
            out.arrays.get("unit_cell_index"),
            Some(&AtomArray::Scalar((0..6).flat_map(|_| [0.0, 1.0]).collect()))
        );
        assert!(out.validate().is_ok());

        // Nothing to repeat
        assert_eq!(supercell(&s, &RepetitionSpec::default()), s);
    }
}
