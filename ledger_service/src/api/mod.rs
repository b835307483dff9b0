pub mod error;
pub mod grpc_service;
pub mod http_routes;
pub mod response;

pub mod proto {
    pub mod ledger {
        tonic::include_proto!("ledger");
    }
}
