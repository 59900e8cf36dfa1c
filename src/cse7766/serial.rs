//! # CSE7766 Serial Communication
//!
//! This module provides the implementation for handling the serial
//! communication aspect of the CSE7766, including connecting to the serial
//! port and draining received telemetry bytes into a [`Cse7766Meter`].
//!
//! The chip transmits continuously; there is no request/response exchange.

use crate::constants::BAUD_RATE;
use crate::cse7766::assembler::BufferSource;
use crate::cse7766::meter::{Cse7766Meter, FrameOutcome};
use crate::error::Cse7766Error;
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;
use tokio_serial::SerialPortBuilderExt;

/// Configuration for the serial connection.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    pub baudrate: u32,
    pub timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        SerialConfig {
            baudrate: BAUD_RATE,
            timeout: Duration::from_millis(100),
        }
    }
}

/// Represents a handle to the CSE7766 serial connection, encapsulating the
/// tokio_serial::SerialStream.
pub struct Cse7766DeviceHandle {
    port: tokio_serial::SerialStream,
    config: SerialConfig,
    started: Instant,
    read_buf: Vec<u8>,
}

impl Cse7766DeviceHandle {
    /// Establishes a connection to the serial port using the provided port
    /// name and the chip's fixed line settings (4800 baud, 8 data bits,
    /// even parity, 1 stop bit).
    pub async fn connect(port_name: &str) -> Result<Cse7766DeviceHandle, Cse7766Error> {
        Self::connect_with_config(port_name, SerialConfig::default()).await
    }

    /// Establishes a connection with custom config.
    pub async fn connect_with_config(
        port_name: &str,
        config: SerialConfig,
    ) -> Result<Cse7766DeviceHandle, Cse7766Error> {
        let port = tokio_serial::new(port_name, config.baudrate)
            .data_bits(tokio_serial::DataBits::Eight)
            .stop_bits(tokio_serial::StopBits::One)
            .parity(tokio_serial::Parity::Even)
            .timeout(config.timeout)
            .open_native_async()
            .map_err(|e| Cse7766Error::SerialPortError(e.to_string()))?;

        Ok(Cse7766DeviceHandle {
            port,
            config,
            started: Instant::now(),
            read_buf: vec![0u8; 256],
        })
    }

    /// Closes the serial port connection. Dropping the handle closes it.
    pub async fn disconnect(&mut self) -> Result<(), Cse7766Error> {
        Ok(())
    }

    /// Milliseconds since the handle was opened; monotonic clock for the
    /// assembler's inter-byte timeout.
    fn now_ms(&self) -> u32 {
        self.started.elapsed().as_millis() as u32
    }

    /// Waits up to the configured timeout for bytes, then feeds whatever
    /// arrived into `meter` and returns the resulting frame outcomes.
    ///
    /// A timeout with no bytes is not an error: the meter is still polled
    /// so its resynchronization timer keeps running.
    pub async fn poll_into(
        &mut self,
        meter: &mut Cse7766Meter,
    ) -> Result<Vec<FrameOutcome>, Cse7766Error> {
        use tokio::time::timeout;

        let mut source = BufferSource::new();
        match timeout(self.config.timeout, self.port.read(&mut self.read_buf)).await {
            Err(_) => {}
            Ok(Ok(0)) => {}
            Ok(Ok(n)) => source.push_bytes(&self.read_buf[..n]),
            Ok(Err(e)) => return Err(Cse7766Error::SerialPortError(e.to_string())),
        }

        Ok(meter.poll(&mut source, self.now_ms()))
    }
}
