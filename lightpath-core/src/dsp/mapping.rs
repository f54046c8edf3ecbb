//! Gray-coded symbol mapping for OOK, PAM, PSK and square QAM.
//!
//! A constellation is stored as a table indexed by the symbol value, where the
//! symbol value is the integer formed by `bits_per_symbol` consecutive bits,
//! most significant bit first. Neighbouring points in the geometry differ in
//! exactly one bit. Every table is scaled to unit average power.

use crate::error::LightpathError;
use crate::units::normalize_power;
use lightpath_schemas::general::ModulationFormat;
use num_complex::Complex64;
use std::f64::consts::PI;

const OOK_ORDERS: &[usize] = &[2];
const PAM_ORDERS: &[usize] = &[2, 4];
const PSK_ORDERS: &[usize] = &[2, 4, 8, 16];
const QAM_ORDERS: &[usize] = &[4, 16, 64, 256];

/// A validated modulation format and order together with its constellation.
#[derive(Debug, Clone, PartialEq)]
pub struct ModulationScheme {
    format: ModulationFormat,
    order: usize,
    constellation: Vec<Complex64>,
}

/// Symbols produced from a bit sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedSymbols {
    pub indices: Vec<usize>,
    pub symbols: Vec<Complex64>,
    /// Bits actually consumed; a trailing partial symbol is dropped.
    pub bits_used: usize,
}

impl ModulationScheme {
    pub fn new(format: ModulationFormat, order: usize) -> Result<Self, LightpathError> {
        let valid = Self::valid_orders(format);
        if !valid.contains(&order) {
            return Err(LightpathError::UnsupportedModulationOrder {
                format,
                order,
                valid,
            });
        }

        let raw = match format {
            ModulationFormat::Ook | ModulationFormat::Pam => pam_points(order),
            ModulationFormat::Psk => psk_points(order),
            ModulationFormat::Qam => qam_points(order),
        };

        Ok(Self {
            format,
            order,
            constellation: normalize_power(&raw),
        })
    }

    pub fn valid_orders(format: ModulationFormat) -> &'static [usize] {
        match format {
            ModulationFormat::Ook => OOK_ORDERS,
            ModulationFormat::Pam => PAM_ORDERS,
            ModulationFormat::Psk => PSK_ORDERS,
            ModulationFormat::Qam => QAM_ORDERS,
        }
    }

    pub fn format(&self) -> ModulationFormat {
        self.format
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn bits_per_symbol(&self) -> usize {
        self.order.trailing_zeros() as usize
    }

    pub fn constellation(&self) -> &[Complex64] {
        &self.constellation
    }

    /// True when every constellation point lies on the real axis, i.e. the
    /// scheme can be carried by a single-drive modulator.
    pub fn is_real(&self) -> bool {
        self.constellation.iter().all(|p| p.im.abs() < 1e-12)
    }

    /// Maps bits (0/1, MSB first) to symbols. Bits that do not fill a whole
    /// symbol at the end of the sequence are ignored.
    pub fn map_bits(&self, bits: &[u8]) -> MappedSymbols {
        let k = self.bits_per_symbol();
        let num_symbols = bits.len() / k;

        let indices: Vec<usize> = bits
            .chunks_exact(k)
            .map(|chunk| {
                chunk
                    .iter()
                    .fold(0usize, |acc, &bit| (acc << 1) | usize::from(bit & 1))
            })
            .collect();
        let symbols = indices.iter().map(|&i| self.constellation[i]).collect();

        MappedSymbols {
            indices,
            symbols,
            bits_used: num_symbols * k,
        }
    }

    /// Bits of one symbol value, MSB first.
    pub fn index_to_bits(&self, index: usize) -> Vec<u8> {
        let k = self.bits_per_symbol();
        if index >= self.order {
            unreachable!("symbol index {} outside a {}-point constellation", index, self.order);
        }
        (0..k).rev().map(|shift| ((index >> shift) & 1) as u8).collect()
    }

    pub fn indices_to_bits(&self, indices: &[usize]) -> Vec<u8> {
        indices
            .iter()
            .flat_map(|&i| self.index_to_bits(i))
            .collect()
    }
}

/// Index of the reference point closest (Euclidean) to `point`.
pub fn nearest(point: Complex64, reference: &[Complex64]) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (i, candidate) in reference.iter().enumerate() {
        let distance = (point - candidate).norm_sqr();
        if distance < best_distance {
            best_distance = distance;
            best = i;
        }
    }
    best
}

fn gray(value: usize) -> usize {
    value ^ (value >> 1)
}

/// Equally spaced amplitude levels `-(M-1), ..., M-1`.
fn pam_levels(order: usize) -> Vec<f64> {
    (0..order)
        .map(|j| 2.0 * j as f64 - (order as f64 - 1.0))
        .collect()
}

fn pam_points(order: usize) -> Vec<Complex64> {
    let mut table = vec![Complex64::new(0.0, 0.0); order];
    for (j, level) in pam_levels(order).into_iter().enumerate() {
        table[gray(j)] = Complex64::new(level, 0.0);
    }
    table
}

fn psk_points(order: usize) -> Vec<Complex64> {
    let offset = if order == 4 { PI / 4.0 } else { 0.0 };
    let mut table = vec![Complex64::new(0.0, 0.0); order];
    for j in 0..order {
        let angle = 2.0 * PI * j as f64 / order as f64 + offset;
        table[gray(j)] = Complex64::from_polar(1.0, angle);
    }
    table
}

fn qam_points(order: usize) -> Vec<Complex64> {
    let half_bits = order.trailing_zeros() as usize / 2;
    let side = 1usize << half_bits;
    let levels = pam_levels(side);

    let mut table = vec![Complex64::new(0.0, 0.0); order];
    for (i, &re) in levels.iter().enumerate() {
        for (q, &im) in levels.iter().enumerate() {
            let index = (gray(i) << half_bits) | gray(q);
            table[index] = Complex64::new(re, im);
        }
    }
    table
}
