use std::{future, sync::Arc};

use tokio_modbus::prelude::*;
use tracing::{debug, error, warn};

use crate::{models::status::StatusCode, ports::VariableReader};

use super::address_space::{encode_double, AddressSpace, REGISTERS_PER_DOUBLE};

/// Largest register count a single Modbus read may ask for.
const MAX_READ_REGISTERS: u16 = 125;

/// Modbus request handler exposing the sensor variables as read-only input
/// registers. Every other function is rejected with `IllegalFunction`.
pub struct SensorVariableService {
    address_space: Arc<AddressSpace>,
    reader: Arc<dyn VariableReader>,
}

impl SensorVariableService {
    pub fn new(address_space: Arc<AddressSpace>, reader: Arc<dyn VariableReader>) -> Self {
        Self {
            address_space,
            reader,
        }
    }

    /// Read `cnt` input registers starting at `addr`. Each variable touched
    /// by the request is read once.
    fn read_input_registers(&self, addr: u16, cnt: u16) -> Result<Vec<u16>, ExceptionCode> {
        if cnt == 0 || cnt > MAX_READ_REGISTERS {
            warn!("Exception::IllegalDataValue - Invalid register count {}", cnt);
            return Err(ExceptionCode::IllegalDataValue);
        }
        let end = addr as u32 + cnt as u32;
        if end > self.address_space.register_count() {
            warn!(
                "Exception::IllegalDataAddress - Registers {}..{} outside of {} variable registers",
                addr,
                end,
                self.address_space.register_count()
            );
            return Err(ExceptionCode::IllegalDataAddress);
        }

        let mut values = Vec::with_capacity(cnt as usize);
        let mut current: Option<(usize, [u16; REGISTERS_PER_DOUBLE as usize])> = None;
        // end <= register_count, which always fits in a u16.
        for register in addr..end as u16 {
            let (index, node) = self
                .address_space
                .node_for_register(register)
                .ok_or(ExceptionCode::IllegalDataAddress)?;

            let words = match current {
                Some((cached, words)) if cached == index => words,
                _ => {
                    let value = self
                        .reader
                        .read_variable(&node.browse_name)
                        .map_err(exception_for_status)?;
                    let words = encode_double(value);
                    current = Some((index, words));
                    words
                }
            };
            values.push(words[(register - node.start_register) as usize]);
        }

        debug!("Read {} input registers from address {}", cnt, addr);
        Ok(values)
    }
}

/// Map a variable read status onto the closest Modbus exception.
pub fn exception_for_status(status: StatusCode) -> ExceptionCode {
    match status {
        StatusCode::BadDataUnavailable => ExceptionCode::ServerDeviceBusy,
        StatusCode::BadNodeIdUnknown => ExceptionCode::GatewayTargetDevice,
    }
}

impl tokio_modbus::server::Service for SensorVariableService {
    type Request = Request<'static>;
    type Response = Response;
    type Exception = ExceptionCode;
    type Future = future::Ready<Result<Self::Response, Self::Exception>>;

    fn call(&self, req: Self::Request) -> Self::Future {
        debug!("Received Modbus request: {:?}", req);

        let res = match req {
            Request::ReadInputRegisters(addr, cnt) => self
                .read_input_registers(addr, cnt)
                .map(Response::ReadInputRegisters),
            _ => {
                warn!("Exception::IllegalFunction - Variables are read-only. Request: {req:?}");
                Err(ExceptionCode::IllegalFunction)
            }
        };

        if let Err(e) = &res {
            error!("Modbus request error: {:?}", e);
        }

        future::ready(res)
    }
}
