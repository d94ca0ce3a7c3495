pub mod banner;
pub mod consultation;
pub mod error;

pub use banner::{Banner, BannerKind};
pub use consultation::{
    ConsultationRecord, NewConsultation, Person, CONSULTATION_TABLE, NOT_SPECIFIED, PERSON_RELATION,
};
pub use error::AppError;
