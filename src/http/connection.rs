use std::sync::Arc;

use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;

use crate::http::Handler;
use crate::http::parser;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;

pub struct Connection {
    stream: TcpStream,
    buffer: Vec<u8>,
    handler: Arc<dyn Handler>,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter, bool), // bool = keep_alive?
    Closed,
}

impl Connection {
    pub fn new(stream: TcpStream, handler: Arc<dyn Handler>) -> Self {
        Self {
            stream,
            buffer: Vec::with_capacity(4096),
            handler,
            state: ConnectionState::Reading,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match &mut self.state {
                ConnectionState::Reading => {
                    match self.read_message().await? {
                        Some(bytes) => match parser::parse_request(&bytes) {
                            Ok(request) => {
                                self.state = ConnectionState::Processing(request);
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "Rejecting unparsable request");
                                let response = Response::bad_request(&e.to_string());
                                let writer = ResponseWriter::new(&response);
                                self.state = ConnectionState::Writing(writer, false);
                            }
                        },
                        None => {
                            self.state = ConnectionState::Closed;
                        }
                    }
                }

                ConnectionState::Processing(request) => {
                    let response = self.handler.handle(request);
                    tracing::debug!(
                        method = %request.method,
                        path = %request.path,
                        status = response.status.as_u16(),
                        "Handled request"
                    );

                    let keep_alive = request.keep_alive();
                    let writer = ResponseWriter::new(&response);
                    self.state = ConnectionState::Writing(writer, keep_alive);
                }

                ConnectionState::Writing(writer, keep_alive) => {
                    writer.write_to_stream(&mut self.stream).await?;

                    if *keep_alive {
                        self.state = ConnectionState::Reading; // go back for next request
                    } else {
                        self.state = ConnectionState::Closed;
                    }
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Reads one complete message off the stream.
    ///
    /// Returns the message bytes once the header terminator and the declared
    /// body length have arrived. If the peer closes early, whatever was
    /// buffered is handed to the parser as-is (a short body degrades to an
    /// unset body rather than an error). `None` on a clean close with
    /// nothing buffered.
    async fn read_message(&mut self) -> anyhow::Result<Option<Vec<u8>>> {
        loop {
            if let Some(total) = parser::message_complete(&self.buffer) {
                let message = self.buffer.drain(..total).collect();
                return Ok(Some(message));
            }

            let mut temp = [0u8; 1024];
            let n = self.stream.read(&mut temp).await?;

            if n == 0 {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                let message = std::mem::take(&mut self.buffer);
                return Ok(Some(message));
            }

            self.buffer.extend_from_slice(&temp[..n]);
        }
    }
}
