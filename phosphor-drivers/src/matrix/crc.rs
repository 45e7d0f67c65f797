//! CRC-8 over the display buffer
//!
//! Used purely for dirty-buffer change detection before a bus write, not
//! for data integrity. Polynomial 0x07 (CRC-8/SMBUS), init 0, table
//! generated at compile time.

const POLY: u8 = 0x07;

static TABLE: [u8; 256] = build_table();

const fn build_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u8;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ POLY
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Checksum a byte slice
pub fn crc8(data: &[u8]) -> u8 {
    data.iter().fold(0, |sum, &byte| TABLE[(sum ^ byte) as usize])
}
