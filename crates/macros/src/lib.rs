#[macro_use]
extern crate quote;

use synstructure::decl_derive;

mod workflow;

decl_derive!([WorkflowError, attributes(workflow)] => workflow::derive_error);
