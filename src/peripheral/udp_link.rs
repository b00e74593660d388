use super::frame::REPORT_SIZE;
use super::link::{LinkError, PeripheralLink};
use crate::event;
use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// `WSAEMSGSIZE`, reported on Windows when a peeked datagram exceeds the buffer.
const WSAEMSGSIZE: i32 = 10040;

/// Whether a receive error only says the waiting datagram was longer than the
/// buffer. The datagram is still there and [`UdpLink::receive`] rejects it.
fn is_truncated_datagram(e: &std::io::Error) -> bool {
    cfg!(windows) && e.raw_os_error() == Some(WSAEMSGSIZE)
}

/// Peripheral link carrying the fixed-size reports as UDP datagrams.
///
/// Used with network-attached controllers and with a device emulator during
/// development. The socket is non-blocking; every datagram is one report.
#[derive(Debug)]
pub struct UdpLink {
    bind: SocketAddr,
    peer: SocketAddr,
    socket: Mutex<Option<UdpSocket>>,
    reception: AtomicBool,
}

impl UdpLink {
    pub fn new(bind: SocketAddr, peer: SocketAddr) -> Self {
        Self { bind, peer, socket: Mutex::new(None), reception: AtomicBool::new(false) }
    }

    /// Address the socket is bound to, once open.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.with_socket(UdpSocket::local_addr).and_then(Result::ok)
    }

    fn with_socket<R>(&self, f: impl FnOnce(&UdpSocket) -> R) -> Option<R> {
        let guard = self.socket.lock().ok()?;
        guard.as_ref().map(f)
    }
}

impl PeripheralLink for UdpLink {
    fn open(&self) -> Result<(), LinkError> {
        let socket = UdpSocket::bind(self.bind)?;
        socket.set_nonblocking(true)?;
        let mut guard =
            self.socket.lock().map_err(|_| LinkError::Unavailable("socket lock poisoned".into()))?;
        *guard = Some(socket);
        Ok(())
    }

    fn close(&self) {
        if let Ok(mut guard) = self.socket.lock() {
            guard.take();
        }
    }

    fn set_reception(&self, enabled: bool) { self.reception.store(enabled, Ordering::Relaxed); }

    fn data_available(&self) -> bool {
        if !self.reception.load(Ordering::Relaxed) {
            return false;
        }
        let mut peeked = [0u8; REPORT_SIZE + 1];
        self.with_socket(|s| match s.peek_from(&mut peeked) {
            Ok(_) => true,
            Err(e) if e.kind() == ErrorKind::WouldBlock => false,
            Err(e) if is_truncated_datagram(&e) => true,
            Err(e) => {
                event!("UDP link peek failed: {e}");
                false
            }
        })
        .unwrap_or(false)
    }

    fn receive(&self) -> Option<Vec<u8>> {
        // one byte of headroom so an oversized datagram shows up as wrong length
        let mut buf = vec![0u8; REPORT_SIZE + 1];
        let len = self.with_socket(|s| s.recv_from(&mut buf).ok().map(|(len, _)| len))??;
        buf.truncate(len);
        Some(buf)
    }

    fn send(&self, report: &[u8]) {
        self.with_socket(|s| {
            if let Err(e) = s.send_to(report, self.peer) {
                event!("UDP link send failed: {e}");
            }
        });
    }
}
