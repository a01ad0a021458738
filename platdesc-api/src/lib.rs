// Copyright (c) 2020-2024, DrMem Contributors
// All rights reserved.
//
// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions are
// met:
//
// 1. Redistributions of source code must retain the above copyright
//    notice, this list of conditions and the following disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright
//    notice, this list of conditions and the following disclaimer in the
//    documentation and/or other materials provided with the distribution.
//
// 3. Neither the name of the copyright holder nor the names of its
//    contributors may be used to endorse or promote products derived
//    from this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS
// "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT
// LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR
// A PARTICULAR PURPOSE ARE DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT
// HOLDER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL,
// SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT
// LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR SERVICES; LOSS OF USE,
// DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY
// THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT
// (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

//! Traits and types that a host embeds to let the platform description
//! driver (`platdesc-driver`) build a machine from a textual
//! description. Analogous in spirit to `drmem-api`: this crate defines
//! the seam, the driver crate implements the logic that runs against
//! it, and a concrete host (see `hosts/platdesc-toy-machine`) provides
//! the other side.

pub mod catalog;
pub mod error;
pub mod init;
pub mod machine;
pub mod types;
pub mod using;
pub mod value;

pub use catalog::TypeCatalog;
pub use error::{ErrorKind, HostError, HostResult, ParsingException};
pub use init::InitHandler;
pub use machine::Machine;
pub use types::{
    CtorDescriptor, ObjectHandle, ParamDescriptor, ParamKind, PropertyDescriptor,
    RegistrationInterface, TypeDescriptor, TypeId,
};
pub use using::UsingResolver;
pub use value::{EnumLiteral, HostValue, NumberKind, NumberLiteral, SimpleValue};
