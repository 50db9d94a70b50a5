mod user;
pub use user::{Account, AccountCreate, Profile, ProfileUpdate};

mod course;
pub use course::{Course, CourseCreate, CourseFilter, CourseUpdate};

mod module;
pub use module::{CourseModule, ModuleCreate};

mod enrollment;
pub use enrollment::{ENROLLMENT_ACTIVE, Enrollment, EnrollmentWithCourse, ProgressUpdate};

mod consultation;
pub use consultation::{
    BookingCreate, Consultation, ConsultationSlot, ConsultationStatus, ConsultationWithSlot,
    SlotCreate, available_slots,
};
