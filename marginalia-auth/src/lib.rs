//! Authentication and principal resolution
//!
//! Turns request credentials and user records into the principal sets used by
//! access-control checks:
//! - `credentials`: HTTP Basic `Authorization` header parsing
//! - `principals`: the user record → principal mapping
//! - `groupfinder`: user lookup followed by that mapping
//! - `translate`: normalisation of principals read from annotation storage

pub mod credentials;
pub mod directory;
pub mod groupfinder;
pub mod principals;
pub mod translate;
pub mod userid;
pub mod username;

pub use credentials::Credentials;
pub use directory::{hash_password, verify_password, Authenticator, UserDirectory};
pub use groupfinder::{GroupFinder, RequestContext};
pub use principals::{principals_for_user, role, system, Principal, PrincipalSet};
pub use translate::{translate_annotation_principals, translate_principal};
pub use userid::{format_userid, split_userid};
pub use username::{Blacklist, UsernameError, UsernamePolicy};
