//! Flat 256-byte memory store.

use thiserror::Error;

/// Size in bytes of the flat address space.
pub const MEMORY_BYTES: usize = u8::MAX as usize + 1;

/// Error returned when a program image cannot be placed in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum LoadImageError {
    /// Image is longer than the address space.
    #[error("program is {len} bytes but memory holds {max}", max = MEMORY_BYTES)]
    ProgramTooLarge {
        /// Length of the rejected image in bytes.
        len: usize,
    },
}

/// Byte-addressable memory with one cell per `u8` address.
///
/// Addresses are `u8`, so every address is in range. The backing store is
/// always exactly [`MEMORY_BYTES`] long.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Memory {
    cells: Box<[u8]>,
}

impl Default for Memory {
    fn default() -> Self {
        Self {
            cells: vec![0; MEMORY_BYTES].into_boxed_slice(),
        }
    }
}

impl Memory {
    /// Reads the byte at `address`.
    #[must_use]
    pub fn read(&self, address: u8) -> u8 {
        self.cells.get(usize::from(address)).copied().unwrap_or(0)
    }

    /// Stores `value` at `address`.
    pub fn write(&mut self, address: u8, value: u8) {
        if let Some(cell) = self.cells.get_mut(usize::from(address)) {
            *cell = value;
        }
    }

    /// Reads three consecutive bytes starting at `address`, wrapping at the
    /// top of memory.
    #[must_use]
    pub fn read_window(&self, address: u8) -> [u8; 3] {
        [
            self.read(address),
            self.read(address.wrapping_add(1)),
            self.read(address.wrapping_add(2)),
        ]
    }

    /// Zeroes memory and copies `image` to addresses `0..image.len()`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadImageError::ProgramTooLarge`] when `image` does not fit.
    /// Memory is left untouched in that case.
    pub fn load_image(&mut self, image: &[u8]) -> Result<(), LoadImageError> {
        if image.len() > MEMORY_BYTES {
            return Err(LoadImageError::ProgramTooLarge { len: image.len() });
        }

        self.cells.fill(0);
        self.cells[..image.len()].copy_from_slice(image);
        Ok(())
    }

    /// Read-only view of the whole store.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::{LoadImageError, Memory, MEMORY_BYTES};

    #[test]
    fn canonical_backing_store_is_256_zeroed_bytes() {
        let memory = Memory::default();
        assert_eq!(memory.as_slice().len(), MEMORY_BYTES);
        assert!(memory.as_slice().iter().all(|byte| *byte == 0));
    }

    #[test]
    fn write_then_read_covers_both_ends_of_the_address_space() {
        let mut memory = Memory::default();
        memory.write(0x00, 0xAB);
        memory.write(0xFF, 0xCD);

        assert_eq!(memory.read(0x00), 0xAB);
        assert_eq!(memory.read(0xFF), 0xCD);
    }

    #[test]
    fn read_window_wraps_past_the_top_of_memory() {
        let mut memory = Memory::default();
        memory.write(0xFE, 1);
        memory.write(0xFF, 2);
        memory.write(0x00, 3);

        assert_eq!(memory.read_window(0xFE), [1, 2, 3]);
    }

    #[test]
    fn load_image_places_bytes_from_address_zero_and_clears_the_rest() {
        let mut memory = Memory::default();
        memory.write(0x80, 0x55);

        memory
            .load_image(&[0x82, 0x00, 0x08])
            .expect("image fits in memory");

        assert_eq!(&memory.as_slice()[..4], &[0x82, 0x00, 0x08, 0x00]);
        assert_eq!(memory.read(0x80), 0);
    }

    #[test]
    fn load_image_accepts_exactly_full_memory() {
        let mut memory = Memory::default();
        let image = vec![0x11; MEMORY_BYTES];

        assert!(memory.load_image(&image).is_ok());
        assert_eq!(memory.read(0xFF), 0x11);
    }

    #[test]
    fn oversized_image_is_rejected_without_touching_memory() {
        let mut memory = Memory::default();
        memory.write(0x10, 0x77);

        let image = vec![0; MEMORY_BYTES + 1];
        assert_eq!(
            memory.load_image(&image),
            Err(LoadImageError::ProgramTooLarge {
                len: MEMORY_BYTES + 1
            })
        );
        assert_eq!(memory.read(0x10), 0x77);
    }
}
