#![allow(dead_code)]
//! In-process Modbus TCP plant used by the integration tests.
//!
//! Speaks just enough of the protocol for the transport under test:
//! holding/input reads, single/multi writes, exception responses and
//! station-scoped register banks. Fault injection covers dropped
//! connections, slow responses and per-address exceptions.

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::RwLock;
use tokio::time::{sleep, Duration};

const EXCEPTION_ILLEGAL_FUNCTION: u8 = 0x01;
const EXCEPTION_ILLEGAL_DATA_ADDRESS: u8 = 0x02;

#[derive(Default)]
struct Bank {
    input: HashMap<u16, u16>,
    holding: HashMap<u16, u16>,
}

#[derive(Default)]
struct PlantState {
    banks: RwLock<HashMap<u8, Bank>>,
    /// (station, address) pairs whose reads answer with an exception.
    read_exceptions: RwLock<HashSet<(u8, u16)>>,
    /// Read requests seen per (station, first address).
    read_counts: RwLock<HashMap<(u8, u16), usize>>,
    response_delay: RwLock<Duration>,
    /// Close the connection instead of answering the next request.
    close_next: AtomicBool,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

pub struct MockPlant {
    addr: SocketAddr,
    state: Arc<PlantState>,
}

impl MockPlant {
    /// Bind an ephemeral port and start serving.
    pub async fn spawn() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(PlantState::default());

        let accept_state = state.clone();
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                let state = accept_state.clone();
                tokio::spawn(async move {
                    let _ = handle_connection(stream, state).await;
                });
            }
        });

        Ok(Self { addr, state })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub async fn set_input_registers(&self, station: u8, address: u16, values: &[u16]) {
        let mut banks = self.state.banks.write().await;
        let bank = banks.entry(station).or_default();
        for (i, value) in values.iter().enumerate() {
            bank.input.insert(address + i as u16, *value);
        }
    }

    pub async fn set_holding_registers(&self, station: u8, address: u16, values: &[u16]) {
        let mut banks = self.state.banks.write().await;
        let bank = banks.entry(station).or_default();
        for (i, value) in values.iter().enumerate() {
            bank.holding.insert(address + i as u16, *value);
        }
    }

    pub async fn holding_register(&self, station: u8, address: u16) -> Option<u16> {
        let banks = self.state.banks.read().await;
        banks.get(&station).and_then(|bank| bank.holding.get(&address)).copied()
    }

    /// Make reads starting at `address` answer with an illegal-data-address
    /// exception for one station.
    pub async fn inject_read_exception(&self, station: u8, address: u16) {
        self.state.read_exceptions.write().await.insert((station, address));
    }

    /// How many read requests started at `address` for a station.
    pub async fn read_count(&self, station: u8, address: u16) -> usize {
        self.state
            .read_counts
            .read()
            .await
            .get(&(station, address))
            .copied()
            .unwrap_or(0)
    }

    pub async fn set_response_delay(&self, delay: Duration) {
        *self.state.response_delay.write().await = delay;
    }

    /// Drop the connection instead of answering the next request.
    pub fn close_on_next_request(&self) {
        self.state.close_next.store(true, Ordering::SeqCst);
    }

    /// Highest number of requests that were ever being served at once.
    /// Stays at 1 when the client serializes correctly.
    pub fn max_in_flight(&self) -> usize {
        self.state.max_in_flight.load(Ordering::SeqCst)
    }
}

async fn handle_connection(mut stream: TcpStream, state: Arc<PlantState>) -> std::io::Result<()> {
    loop {
        let mut header = [0u8; 7];
        if stream.read_exact(&mut header).await.is_err() {
            return Ok(()); // client went away
        }
        let transaction_id = u16::from_be_bytes([header[0], header[1]]);
        let length = u16::from_be_bytes([header[4], header[5]]) as usize;
        let station = header[6];

        let mut body = vec![0u8; length.saturating_sub(1)];
        stream.read_exact(&mut body).await?;

        if state.close_next.swap(false, Ordering::SeqCst) {
            return Ok(()); // simulate a dropped link mid-request
        }

        let in_flight = state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        state.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);

        let delay = *state.response_delay.read().await;
        if delay > Duration::ZERO {
            sleep(delay).await;
        }

        let pdu = process_request(&state, station, &body).await;
        state.in_flight.fetch_sub(1, Ordering::SeqCst);

        let mut response = Vec::with_capacity(7 + pdu.len());
        response.extend_from_slice(&transaction_id.to_be_bytes());
        response.extend_from_slice(&[0, 0]); // protocol id
        response.extend_from_slice(&((pdu.len() + 1) as u16).to_be_bytes());
        response.push(station);
        response.extend_from_slice(&pdu);
        stream.write_all(&response).await?;
    }
}

/// Build the response PDU (function code onwards) for one request.
async fn process_request(state: &PlantState, station: u8, body: &[u8]) -> Vec<u8> {
    let Some((&function, data)) = body.split_first() else {
        return exception(0, EXCEPTION_ILLEGAL_FUNCTION);
    };
    match function {
        0x03 | 0x04 => read_registers(state, station, function, data).await,
        0x06 => write_single(state, station, data).await,
        0x10 => write_multiple(state, station, data).await,
        _ => exception(function, EXCEPTION_ILLEGAL_FUNCTION),
    }
}

async fn read_registers(state: &PlantState, station: u8, function: u8, data: &[u8]) -> Vec<u8> {
    if data.len() < 4 {
        return exception(function, EXCEPTION_ILLEGAL_DATA_ADDRESS);
    }
    let address = u16::from_be_bytes([data[0], data[1]]);
    let quantity = u16::from_be_bytes([data[2], data[3]]);

    *state
        .read_counts
        .write()
        .await
        .entry((station, address))
        .or_insert(0) += 1;

    if state.read_exceptions.read().await.contains(&(station, address)) {
        return exception(function, EXCEPTION_ILLEGAL_DATA_ADDRESS);
    }
    if quantity == 0 || quantity > 125 {
        return exception(function, EXCEPTION_ILLEGAL_DATA_ADDRESS);
    }

    let banks = state.banks.read().await;
    let empty = Bank::default();
    let bank = banks.get(&station).unwrap_or(&empty);
    let table = if function == 0x04 { &bank.input } else { &bank.holding };

    let mut pdu = vec![function, (quantity * 2) as u8];
    for i in 0..quantity {
        let value = table.get(&(address + i)).copied().unwrap_or(0);
        pdu.extend_from_slice(&value.to_be_bytes());
    }
    pdu
}

async fn write_single(state: &PlantState, station: u8, data: &[u8]) -> Vec<u8> {
    if data.len() < 4 {
        return exception(0x06, EXCEPTION_ILLEGAL_DATA_ADDRESS);
    }
    let address = u16::from_be_bytes([data[0], data[1]]);
    let value = u16::from_be_bytes([data[2], data[3]]);

    let mut banks = state.banks.write().await;
    banks.entry(station).or_default().holding.insert(address, value);

    let mut pdu = vec![0x06];
    pdu.extend_from_slice(&address.to_be_bytes());
    pdu.extend_from_slice(&value.to_be_bytes());
    pdu
}

async fn write_multiple(state: &PlantState, station: u8, data: &[u8]) -> Vec<u8> {
    if data.len() < 5 {
        return exception(0x10, EXCEPTION_ILLEGAL_DATA_ADDRESS);
    }
    let address = u16::from_be_bytes([data[0], data[1]]);
    let quantity = u16::from_be_bytes([data[2], data[3]]);
    let byte_count = data[4] as usize;
    if byte_count != quantity as usize * 2 || data.len() < 5 + byte_count {
        return exception(0x10, EXCEPTION_ILLEGAL_DATA_ADDRESS);
    }

    let mut banks = state.banks.write().await;
    let bank = banks.entry(station).or_default();
    for i in 0..quantity {
        let offset = 5 + (i as usize) * 2;
        let value = u16::from_be_bytes([data[offset], data[offset + 1]]);
        bank.holding.insert(address + i, value);
    }

    let mut pdu = vec![0x10];
    pdu.extend_from_slice(&address.to_be_bytes());
    pdu.extend_from_slice(&quantity.to_be_bytes());
    pdu
}

fn exception(function: u8, code: u8) -> Vec<u8> {
    vec![function | 0x80, code]
}
