pub mod directory;

pub use directory::DoctorService;
