//! Error-detecting and error-correcting codes for the printed tag payload.

/// CRC-16/CCITT-FALSE: polynomial 0x1021, initial value 0xFFFF, no reflection, no final xor.
pub fn crc16_ccitt(bytes: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in bytes {
        crc ^= u16::from(byte) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ 0x1021
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// Computes the parity half of an 8-byte tag payload from its first four bytes.
pub trait ParityEncoder {
    fn parity(&self, message: &[u8; 4]) -> [u8; 4];
}

const PRIMITIVE_POLYNOMIAL: u16 = 0x11d;

struct GaloisTables {
    exp: [u8; 512],
    log: [u8; 256],
}

const fn build_tables() -> GaloisTables {
    let mut exp = [0u8; 512];
    let mut log = [0u8; 256];
    let mut x: u16 = 1;
    let mut i = 0;
    while i < 255 {
        exp[i] = x as u8;
        log[x as usize] = i as u8;
        x <<= 1;
        if x & 0x100 != 0 {
            x ^= PRIMITIVE_POLYNOMIAL;
        }
        i += 1;
    }
    while i < 512 {
        exp[i] = exp[i - 255];
        i += 1;
    }
    GaloisTables { exp, log }
}

static GF: GaloisTables = build_tables();

fn gf_mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    GF.exp[GF.log[a as usize] as usize + GF.log[b as usize] as usize]
}

fn gf_pow2(power: usize) -> u8 {
    GF.exp[power % 255]
}

/// Systematic Reed-Solomon RS(8, 4) over GF(2^8), generator roots `α^0 .. α^3`.
///
/// Corrects up to two corrupted bytes of the payload.
#[derive(Debug, Clone)]
pub struct ReedSolomon84 {
    /// Generator polynomial, highest degree first; `generator[0] == 1`.
    generator: [u8; 5],
}

impl Default for ReedSolomon84 {
    fn default() -> Self {
        Self::new()
    }
}

impl ReedSolomon84 {
    pub fn new() -> Self {
        let mut generator = [0u8; 5];
        generator[0] = 1;
        for root in 0..4 {
            let alpha = gf_pow2(root);
            // Multiply the degree-`root` polynomial by (x + α^root).
            for j in (1..=root + 1).rev() {
                generator[j] ^= gf_mul(generator[j - 1], alpha);
            }
        }
        Self { generator }
    }
}

impl ParityEncoder for ReedSolomon84 {
    fn parity(&self, message: &[u8; 4]) -> [u8; 4] {
        let mut remainder = [0u8; 4];
        for &byte in message {
            let feedback = byte ^ remainder[0];
            for j in 0..3 {
                remainder[j] = remainder[j + 1] ^ gf_mul(feedback, self.generator[j + 1]);
            }
            remainder[3] = gf_mul(feedback, self.generator[4]);
        }
        remainder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluate(codeword: &[u8], x: u8) -> u8 {
        codeword.iter().fold(0, |acc, &c| gf_mul(acc, x) ^ c)
    }

    #[test]
    fn crc_check_value() {
        assert_eq!(crc16_ccitt(b"123456789"), 0x29B1);
        assert_eq!(crc16_ccitt(&[]), 0xFFFF);
    }

    #[test]
    fn field_tables_are_consistent() {
        assert_eq!(gf_pow2(0), 1);
        assert_eq!(gf_pow2(8), 0x1d);
        assert_eq!(gf_pow2(255), 1);
        for a in 1..=255u8 {
            assert_eq!(gf_mul(a, 1), a);
        }
    }

    #[test]
    fn generator_has_the_expected_roots() {
        let rs = ReedSolomon84::new();
        for root in 0..4 {
            assert_eq!(evaluate(&rs.generator, gf_pow2(root)), 0);
        }
    }

    #[test]
    fn codewords_have_zero_syndromes() {
        let rs = ReedSolomon84::new();
        for message in [[0u8, 0, 0, 0], [1, 0, 0xa5, 0x3c], [0xff, 0xff, 0x12, 0x34]] {
            let parity = rs.parity(&message);
            let codeword: Vec<u8> = message.iter().chain(parity.iter()).copied().collect();
            for root in 0..4 {
                assert_eq!(evaluate(&codeword, gf_pow2(root)), 0, "{message:?} root {root}");
            }
        }
    }

    #[test]
    fn zero_message_has_zero_parity() {
        assert_eq!(ReedSolomon84::new().parity(&[0; 4]), [0; 4]);
    }
}
