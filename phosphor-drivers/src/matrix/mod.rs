//! Cascaded MAX7219 matrix driver
//!
//! Drives a `cols x rows` grid of daisy-chained 8x8 LED driver chips over
//! one shared SPI bus and chip-select line. The driver owns the shared
//! pixel buffer; animation code draws into it via [`Matrix::bitmap_mut`]
//! and [`Matrix::show`] pushes it to the hardware.
//!
//! All chips share the clock and shift data through sequentially, so
//! addressing one device's row register means clocking out a no-op pair
//! for every other device in the chain within the same chip-select
//! assertion. `show` checksums the buffer and skips the whole transfer
//! when nothing changed since the last transmission.

mod crc;

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

use phosphor_core::render::Bitmap;

use crc::crc8;

/// Pixels per device side
pub const PIXELS_PER_SIDE: usize = 8;

/// Upper bound on the skip list
pub const MAX_SKIP_DEVICES: usize = 32;

/// MAX7219 register commands
mod cmd {
    pub const NOOP: u8 = 0x00;
    pub const DIGIT_0: u8 = 0x01;
    pub const DECODE_MODE: u8 = 0x09;
    pub const INTENSITY: u8 = 0x0A;
    pub const SCAN_LIMIT: u8 = 0x0B;
    pub const SHUTDOWN: u8 = 0x0C;
    pub const DISPLAY_TEST: u8 = 0x0F;
}

/// Matrix driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MatrixError<SpiE, PinE> {
    /// SPI transfer failed
    Spi(SpiE),
    /// Chip-select pin failed
    Pin(PinE),
    /// Intensity outside 0..=15, rejected before any transmission
    InvalidBrightness(u8),
}

/// Grid geometry and chain quirks
#[derive(Debug, Clone, Default)]
pub struct MatrixConfig {
    /// Devices across
    pub cols: usize,
    /// Devices down
    pub rows: usize,
    /// Device ids are wired in reverse chain order
    pub reverse_ids: bool,
    /// Devices that occupy buffer space but are never transmitted to
    pub skip_devices: heapless::Vec<usize, MAX_SKIP_DEVICES>,
}

/// Driver for a chain of cascaded MAX7219 8x8 matrices
pub struct Matrix<SPI, CS> {
    spi: SPI,
    cs: CS,
    config: MatrixConfig,
    bitmap: Bitmap,
    /// Checksum of the buffer as last transmitted
    checksum: u8,
}

impl<SPI, CS> Matrix<SPI, CS>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
{
    /// Create the driver and run the chip init sequence
    pub fn new(
        spi: SPI,
        cs: CS,
        config: MatrixConfig,
    ) -> Result<Self, MatrixError<SPI::Error, CS::Error>> {
        let bitmap = Bitmap::new(
            config.cols * PIXELS_PER_SIDE,
            config.rows * PIXELS_PER_SIDE,
        );
        let mut matrix = Self {
            spi,
            cs,
            config,
            bitmap,
            checksum: 0,
        };
        matrix.cs.set_high().map_err(MatrixError::Pin)?;
        matrix.write_init()?;
        Ok(matrix)
    }

    /// Number of devices in the chain
    pub fn device_count(&self) -> usize {
        self.config.cols * self.config.rows
    }

    /// Display width in pixels
    pub fn width(&self) -> usize {
        self.config.cols * PIXELS_PER_SIDE
    }

    /// Display height in pixels
    pub fn height(&self) -> usize {
        self.config.rows * PIXELS_PER_SIDE
    }

    /// The shared pixel buffer
    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    /// The shared pixel buffer, for drawing
    pub fn bitmap_mut(&mut self) -> &mut Bitmap {
        &mut self.bitmap
    }

    /// Whether the buffer differs from the last transmitted contents
    pub fn is_changed(&self) -> bool {
        crc8(self.bitmap.as_bytes()) != self.checksum
    }

    /// Set chip intensity, 0..=15
    pub fn brightness(&mut self, value: u8) -> Result<(), MatrixError<SPI::Error, CS::Error>> {
        if value > 15 {
            return Err(MatrixError::InvalidBrightness(value));
        }
        self.write_all(cmd::INTENSITY, value)
    }

    /// Put every chip into shutdown
    pub fn shutdown(&mut self) -> Result<(), MatrixError<SPI::Error, CS::Error>> {
        self.write_all(cmd::SHUTDOWN, 0)
    }

    /// Wake every chip from shutdown
    pub fn wake(&mut self) -> Result<(), MatrixError<SPI::Error, CS::Error>> {
        self.write_all(cmd::SHUTDOWN, 1)
    }

    /// Enable or disable the all-pixels-on hardware test mode
    pub fn display_test(&mut self, enable: bool) -> Result<(), MatrixError<SPI::Error, CS::Error>> {
        self.write_all(cmd::DISPLAY_TEST, enable as u8)
    }

    /// Transmit the buffer to the chain
    ///
    /// A no-op when the buffer checksum matches the last transmission,
    /// unless `force` is set. The cached checksum is updated only after a
    /// successful transfer.
    pub fn show(&mut self, force: bool) -> Result<(), MatrixError<SPI::Error, CS::Error>> {
        if !self.is_changed() && !force {
            return Ok(());
        }
        for device_id in 0..self.device_count() {
            self.show_device(device_id)?;
        }
        self.checksum = crc8(self.bitmap.as_bytes());
        Ok(())
    }

    /// Broadcast one command/data pair to every chip in the chain
    fn write_all(&mut self, command: u8, data: u8) -> Result<(), MatrixError<SPI::Error, CS::Error>> {
        self.cs.set_low().map_err(MatrixError::Pin)?;
        for _ in 0..self.device_count() {
            self.spi.write(&[command, data]).map_err(MatrixError::Spi)?;
        }
        self.cs.set_high().map_err(MatrixError::Pin)
    }

    fn write_init(&mut self) -> Result<(), MatrixError<SPI::Error, CS::Error>> {
        for (command, data) in [
            (cmd::SHUTDOWN, 0),
            (cmd::DISPLAY_TEST, 0),
            (cmd::SCAN_LIMIT, 7),
            (cmd::DECODE_MODE, 0),
            (cmd::SHUTDOWN, 1),
        ] {
            self.write_all(command, data)?;
        }
        Ok(())
    }

    /// Buffer byte index holding `row_number` of `device_id`
    ///
    /// The buffer is laid out as whole pixel rows of the grid, one byte
    /// per device column, so device `d`'s rows sit every `cols` bytes
    /// starting at its grid position.
    fn buffer_index(&self, device_id: usize, row_number: usize) -> usize {
        debug_assert!(device_id < self.device_count());
        debug_assert!(row_number < PIXELS_PER_SIDE);
        let device_id = if self.config.reverse_ids {
            self.device_count() - device_id - 1
        } else {
            device_id
        };
        (device_id / self.config.cols * PIXELS_PER_SIDE + row_number) * self.config.cols
            + device_id % self.config.cols
    }

    /// Transmit all 8 row registers of one device
    ///
    /// Devices deeper in the chain (higher index) are fed first: their
    /// no-op pairs shift through the nearer chips ahead of the real
    /// command, which then lands on the target as trailing no-ops push it
    /// into place.
    fn show_device(&mut self, device_id: usize) -> Result<(), MatrixError<SPI::Error, CS::Error>> {
        if self.config.skip_devices.contains(&device_id) {
            return Ok(());
        }
        for row in 0..PIXELS_PER_SIDE {
            let command = cmd::DIGIT_0 + row as u8;
            let data = self.bitmap.as_bytes()[self.buffer_index(device_id, row)];
            self.cs.set_low().map_err(MatrixError::Pin)?;
            for _ in device_id + 1..self.device_count() {
                self.spi.write(&[cmd::NOOP, 0]).map_err(MatrixError::Spi)?;
            }
            self.spi.write(&[command, data]).map_err(MatrixError::Spi)?;
            for _ in 0..device_id {
                self.spi.write(&[cmd::NOOP, 0]).map_err(MatrixError::Spi)?;
            }
            self.cs.set_high().map_err(MatrixError::Pin)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use core::convert::Infallible;
    use proptest::prelude::*;

    /// One logged bus event
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Event {
        CsLow,
        CsHigh,
        Byte(u8),
    }

    type Log = RefCell<heapless::Vec<Event, 8192>>;

    struct MockSpi<'a>(&'a Log);
    struct MockCs<'a>(&'a Log);

    impl embedded_hal::spi::ErrorType for MockSpi<'_> {
        type Error = Infallible;
    }

    impl SpiBus<u8> for MockSpi<'_> {
        fn read(&mut self, _words: &mut [u8]) -> Result<(), Infallible> {
            Ok(())
        }
        fn write(&mut self, words: &[u8]) -> Result<(), Infallible> {
            let mut log = self.0.borrow_mut();
            for &byte in words {
                log.push(Event::Byte(byte)).unwrap();
            }
            Ok(())
        }
        fn transfer(&mut self, _read: &mut [u8], _write: &[u8]) -> Result<(), Infallible> {
            Ok(())
        }
        fn transfer_in_place(&mut self, _words: &mut [u8]) -> Result<(), Infallible> {
            Ok(())
        }
        fn flush(&mut self) -> Result<(), Infallible> {
            Ok(())
        }
    }

    impl embedded_hal::digital::ErrorType for MockCs<'_> {
        type Error = Infallible;
    }

    impl OutputPin for MockCs<'_> {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.0.borrow_mut().push(Event::CsLow).unwrap();
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Infallible> {
            self.0.borrow_mut().push(Event::CsHigh).unwrap();
            Ok(())
        }
    }

    fn matrix<'a>(
        log: &'a Log,
        cols: usize,
        rows: usize,
        reverse_ids: bool,
        skip: &[usize],
    ) -> Matrix<MockSpi<'a>, MockCs<'a>> {
        let mut skip_devices = heapless::Vec::new();
        for &id in skip {
            skip_devices.push(id).unwrap();
        }
        let config = MatrixConfig {
            cols,
            rows,
            reverse_ids,
            skip_devices,
        };
        let matrix = Matrix::new(MockSpi(log), MockCs(log), config).unwrap();
        log.borrow_mut().clear(); // drop the init traffic
        matrix
    }

    fn bytes(log: &Log) -> heapless::Vec<u8, 8192> {
        log.borrow()
            .iter()
            .filter_map(|event| match event {
                Event::Byte(byte) => Some(*byte),
                _ => None,
            })
            .collect()
    }

    fn cs_assertions(log: &Log) -> usize {
        log.borrow().iter().filter(|&&e| e == Event::CsLow).count()
    }

    #[test]
    fn test_init_sequence() {
        let log = Log::default();
        let _ = Matrix::new(
            MockSpi(&log),
            MockCs(&log),
            MatrixConfig { cols: 2, rows: 1, ..Default::default() },
        )
        .unwrap();
        let log = log.borrow();
        // CS idles high before the first command
        assert_eq!(log[0], Event::CsHigh);
        // Five broadcast writes, each framed by one CS assertion and
        // repeating its pair for both devices
        let mut events = log[1..].iter();
        for (command, data) in [
            (cmd::SHUTDOWN, 0),
            (cmd::DISPLAY_TEST, 0),
            (cmd::SCAN_LIMIT, 7),
            (cmd::DECODE_MODE, 0),
            (cmd::SHUTDOWN, 1),
        ] {
            assert_eq!(events.next(), Some(&Event::CsLow));
            for _ in 0..2 {
                assert_eq!(events.next(), Some(&Event::Byte(command)));
                assert_eq!(events.next(), Some(&Event::Byte(data)));
            }
            assert_eq!(events.next(), Some(&Event::CsHigh));
        }
        assert_eq!(events.next(), None);
    }

    #[test]
    fn test_buffer_index_matches_grid_layout() {
        let log = Log::default();
        let matrix = matrix(&log, 3, 3, false, &[]);
        // Center device, row 2: (4/3*8 + 2)*3 + 4%3 = 31
        assert_eq!(matrix.buffer_index(4, 2), 31);
        assert_eq!(matrix.buffer_index(0, 0), 0);
        assert_eq!(matrix.buffer_index(8, 7), 71);
    }

    #[test]
    fn test_buffer_index_reversed_ids() {
        let log = Log::default();
        let matrix = matrix(&log, 3, 3, true, &[]);
        // Device 4 reverses onto itself in a 9-chip chain
        assert_eq!(matrix.buffer_index(4, 2), 31);
        // Device 0 becomes device 8
        assert_eq!(matrix.buffer_index(0, 0), matrix.buffer_index_unreversed(8, 0));
    }

    impl<'a> Matrix<MockSpi<'a>, MockCs<'a>> {
        fn buffer_index_unreversed(&self, device_id: usize, row: usize) -> usize {
            (device_id / self.config.cols * PIXELS_PER_SIDE + row) * self.config.cols
                + device_id % self.config.cols
        }
    }

    proptest! {
        #[test]
        fn prop_addressing_is_a_bijection(
            cols in 1usize..=4,
            rows in 1usize..=4,
            reverse_ids in any::<bool>(),
        ) {
            let log = Log::default();
            let matrix = matrix(&log, cols, rows, reverse_ids, &[]);
            let size = cols * rows * PIXELS_PER_SIDE;
            let mut seen = [false; 4 * 4 * PIXELS_PER_SIDE];
            for device in 0..cols * rows {
                for row in 0..PIXELS_PER_SIDE {
                    let index = matrix.buffer_index(device, row);
                    prop_assert!(index < size);
                    prop_assert!(!seen[index]);
                    seen[index] = true;
                }
            }
        }
    }

    #[test]
    fn test_show_skips_unchanged_buffer() {
        let log = Log::default();
        let mut matrix = matrix(&log, 2, 1, false, &[]);
        matrix.bitmap_mut().set_pixel(0, 0, true);
        assert!(matrix.is_changed());

        matrix.show(false).unwrap();
        assert!(!matrix.is_changed());
        let sent = bytes(&log).len();
        assert!(sent > 0);

        // Unchanged buffer: second show is a no-op
        matrix.show(false).unwrap();
        assert_eq!(bytes(&log).len(), sent);

        // Force always transmits
        matrix.show(true).unwrap();
        assert_eq!(bytes(&log).len(), sent * 2);
    }

    #[test]
    fn test_show_wire_order_two_devices() {
        let log = Log::default();
        let mut matrix = matrix(&log, 2, 1, false, &[]);
        matrix.bitmap_mut().set_pixel(0, 0, true); // device 0, row 0, MSB
        matrix.show(false).unwrap();

        let log_ref = log.borrow();
        let mut events = log_ref.iter();
        // Device 0, row 0: the chain is fed device 1's no-op first, then
        // the real pair that shifts into device 0
        assert_eq!(events.next(), Some(&Event::CsLow));
        assert_eq!(events.next(), Some(&Event::Byte(cmd::NOOP)));
        assert_eq!(events.next(), Some(&Event::Byte(0)));
        assert_eq!(events.next(), Some(&Event::Byte(cmd::DIGIT_0)));
        assert_eq!(events.next(), Some(&Event::Byte(0x80)));
        assert_eq!(events.next(), Some(&Event::CsHigh));
        drop(log_ref);

        // One CS assertion per row per device
        assert_eq!(cs_assertions(&log), 2 * PIXELS_PER_SIDE);

        // Device 1's rows put the no-op pair after the real command
        let log_ref = log.borrow();
        let device1_row0 = &log_ref[PIXELS_PER_SIDE * 6..]; // 6 events per row
        assert_eq!(
            &device1_row0[..6],
            &[
                Event::CsLow,
                Event::Byte(cmd::DIGIT_0),
                Event::Byte(0x00),
                Event::Byte(cmd::NOOP),
                Event::Byte(0),
                Event::CsHigh,
            ][..]
        );
    }

    #[test]
    fn test_skip_devices_not_transmitted() {
        let log = Log::default();
        let mut matrix = matrix(&log, 2, 1, false, &[0]);
        matrix.show(true).unwrap();
        // Only device 1's 8 rows went out
        assert_eq!(cs_assertions(&log), PIXELS_PER_SIDE);
        // But the skipped device still owns buffer space: addressing is
        // unaffected
        assert_eq!(matrix.buffer_index(1, 0), 1);
    }

    #[test]
    fn test_brightness_range_check() {
        let log = Log::default();
        let mut matrix = matrix(&log, 1, 1, false, &[]);
        assert_eq!(matrix.brightness(16), Err(MatrixError::InvalidBrightness(16)));
        assert!(bytes(&log).is_empty()); // rejected before any bus traffic

        matrix.brightness(15).unwrap();
        assert_eq!(bytes(&log).as_slice(), [cmd::INTENSITY, 15]);
    }

    #[test]
    fn test_power_and_test_commands() {
        let log = Log::default();
        let mut matrix = matrix(&log, 1, 1, false, &[]);
        matrix.shutdown().unwrap();
        matrix.wake().unwrap();
        matrix.display_test(true).unwrap();
        assert_eq!(
            bytes(&log).as_slice(),
            [cmd::SHUTDOWN, 0, cmd::SHUTDOWN, 1, cmd::DISPLAY_TEST, 1]
        );
    }

    #[test]
    fn test_dimensions() {
        let log = Log::default();
        let matrix = matrix(&log, 3, 2, false, &[]);
        assert_eq!(matrix.width(), 24);
        assert_eq!(matrix.height(), 16);
        assert_eq!(matrix.device_count(), 6);
        assert_eq!(matrix.bitmap().width(), 24);
        assert_eq!(matrix.bitmap().height(), 16);
    }
}
