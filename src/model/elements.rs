// src/model/elements.rs

/// Static per-element data used for centring and atom styling.
/// Radii are covalent radii (Cordero et al. 2008), colors are Jmol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementData {
    pub symbol: &'static str,
    pub number: u32,
    pub mass: f64,
    pub covalent_radius: f64,
    pub color: (u8, u8, u8),
}

const fn el(
    symbol: &'static str,
    number: u32,
    mass: f64,
    covalent_radius: f64,
    color: (u8, u8, u8),
) -> ElementData {
    ElementData { symbol, number, mass, covalent_radius, color }
}

/// Dummy entry for unknown species: hot pink so it is obvious in the viewer.
pub const UNKNOWN: ElementData = el("X", 0, 1.0, 1.00, (255, 20, 147));

static ELEMENTS: &[ElementData] = &[
    // --- Period 1 ---
    el("H", 1, 1.008, 0.31, (255, 255, 255)),
    el("He", 2, 4.0026, 0.28, (217, 255, 255)),
    // --- Period 2 ---
    el("Li", 3, 6.94, 1.28, (204, 128, 255)),
    el("Be", 4, 9.0122, 0.96, (194, 255, 0)),
    el("B", 5, 10.81, 0.84, (255, 181, 181)),
    el("C", 6, 12.011, 0.76, (144, 144, 144)),
    el("N", 7, 14.007, 0.71, (48, 80, 248)),
    el("O", 8, 15.999, 0.66, (255, 13, 13)),
    el("F", 9, 18.998, 0.57, (144, 224, 80)),
    el("Ne", 10, 20.180, 0.58, (179, 227, 245)),
    // --- Period 3 ---
    el("Na", 11, 22.990, 1.66, (171, 92, 242)),
    el("Mg", 12, 24.305, 1.41, (138, 255, 0)),
    el("Al", 13, 26.982, 1.21, (191, 166, 166)),
    el("Si", 14, 28.085, 1.11, (240, 200, 160)),
    el("P", 15, 30.974, 1.07, (255, 128, 0)),
    el("S", 16, 32.06, 1.05, (255, 255, 48)),
    el("Cl", 17, 35.45, 1.02, (31, 240, 31)),
    el("Ar", 18, 39.948, 1.06, (128, 209, 227)),
    // --- Period 4 ---
    el("K", 19, 39.098, 2.03, (143, 64, 212)),
    el("Ca", 20, 40.078, 1.76, (61, 255, 0)),
    el("Sc", 21, 44.956, 1.70, (230, 230, 230)),
    el("Ti", 22, 47.867, 1.60, (191, 194, 199)),
    el("V", 23, 50.942, 1.53, (166, 166, 171)),
    el("Cr", 24, 51.996, 1.39, (138, 153, 199)),
    el("Mn", 25, 54.938, 1.39, (156, 122, 199)),
    el("Fe", 26, 55.845, 1.32, (224, 102, 51)),
    el("Co", 27, 58.933, 1.26, (240, 144, 160)),
    el("Ni", 28, 58.693, 1.24, (80, 208, 80)),
    el("Cu", 29, 63.546, 1.32, (200, 128, 51)),
    el("Zn", 30, 65.38, 1.22, (125, 128, 176)),
    el("Ga", 31, 69.723, 1.22, (194, 143, 143)),
    el("Ge", 32, 72.630, 1.20, (102, 143, 143)),
    el("As", 33, 74.922, 1.19, (189, 128, 227)),
    el("Se", 34, 78.971, 1.20, (255, 161, 0)),
    el("Br", 35, 79.904, 1.20, (166, 41, 41)),
    el("Kr", 36, 83.798, 1.16, (92, 184, 209)),
    // --- Period 5 ---
    el("Rb", 37, 85.468, 2.20, (112, 46, 176)),
    el("Sr", 38, 87.62, 1.95, (0, 255, 0)),
    el("Y", 39, 88.906, 1.90, (148, 255, 255)),
    el("Zr", 40, 91.224, 1.75, (148, 224, 224)),
    el("Nb", 41, 92.906, 1.64, (115, 194, 201)),
    el("Mo", 42, 95.95, 1.54, (84, 181, 181)),
    el("Tc", 43, 97.907, 1.47, (59, 158, 158)),
    el("Ru", 44, 101.07, 1.46, (36, 143, 143)),
    el("Rh", 45, 102.91, 1.42, (10, 125, 140)),
    el("Pd", 46, 106.42, 1.39, (0, 105, 133)),
    el("Ag", 47, 107.87, 1.45, (192, 192, 192)),
    el("Cd", 48, 112.41, 1.44, (255, 217, 143)),
    el("In", 49, 114.82, 1.42, (166, 117, 115)),
    el("Sn", 50, 118.71, 1.39, (102, 128, 128)),
    el("Sb", 51, 121.76, 1.39, (158, 99, 181)),
    el("Te", 52, 127.60, 1.38, (212, 122, 0)),
    el("I", 53, 126.90, 1.39, (148, 0, 148)),
    el("Xe", 54, 131.29, 1.40, (66, 158, 176)),
    // --- Period 6 (selected) ---
    el("Cs", 55, 132.91, 2.44, (87, 23, 143)),
    el("Ba", 56, 137.33, 2.15, (0, 201, 0)),
    el("W", 74, 183.84, 1.62, (33, 148, 214)),
    el("Pt", 78, 195.08, 1.36, (208, 208, 224)),
    el("Au", 79, 196.97, 1.36, (255, 209, 35)),
    el("Hg", 80, 200.59, 1.32, (184, 184, 208)),
    el("Pb", 82, 207.2, 1.46, (87, 89, 97)),
    el("Bi", 83, 208.98, 1.48, (158, 79, 181)),
];

/// Looks up an element by symbol. Case is normalised ("CL" and "cl" both give Cl).
pub fn lookup(element: &str) -> Option<&'static ElementData> {
    let symbol = normalize_symbol(element);
    ELEMENTS.iter().find(|e| e.symbol == symbol)
}

/// Lookup with the dummy fallback for unknown species.
pub fn element_data(element: &str) -> &'static ElementData {
    lookup(element).unwrap_or(&UNKNOWN)
}

/// Returns the Atomic Number (Z) for a given element symbol, 0 if unknown.
pub fn get_atomic_number(element: &str) -> u32 {
    element_data(element).number
}

pub fn get_atomic_mass(element: &str) -> f64 {
    element_data(element).mass
}

/// Returns (covalent_radius_in_angstroms, (r, g, b)) with channels in [0, 1].
pub fn get_atom_properties(element: &str) -> (f64, (f64, f64, f64)) {
    let data = element_data(element);
    let (r, g, b) = data.color;
    (
        data.covalent_radius,
        (r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0),
    )
}

pub fn symbol_for_number(number: u32) -> Option<&'static str> {
    ELEMENTS.iter().find(|e| e.number == number).map(|e| e.symbol)
}

/// "#rrggbb" for an 8-bit RGB triple.
pub fn hex_color(rgb: (u8, u8, u8)) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb.0, rgb.1, rgb.2)
}

fn normalize_symbol(element: &str) -> String {
    let trimmed = element.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => {
            let mut s: String = first.to_uppercase().collect();
            s.extend(chars.flat_map(|c| c.to_lowercase()));
            s
        }
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_elements() {
        assert_eq!(get_atomic_number("O"), 8);
        assert_eq!(get_atomic_number("Si"), 14);
        assert_eq!(get_atomic_number("cl"), 17);
        assert!((get_atomic_mass("C") - 12.011).abs() < 1e-9);

        let (radius, _) = get_atom_properties("H");
        assert!((radius - 0.31).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_falls_back_to_dummy() {
        assert_eq!(get_atomic_number("Qq"), 0);
        assert_eq!(element_data("").symbol, "X");
        assert_eq!(hex_color(element_data("Qq").color), "#ff1493");
    }

    #[test]
    fn test_hex_color() {
        assert_eq!(hex_color((0, 0, 255)), "#0000ff");
        assert_eq!(hex_color(element_data("O").color), "#ff0d0d");
        assert_eq!(symbol_for_number(26), Some("Fe"));
    }
}
