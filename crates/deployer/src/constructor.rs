use {
    crate::artifacts::Artifact,
    alloy::{
        dyn_abi::{DynSolValue, JsonAbiExt, Specifier},
        primitives::Bytes,
    },
    thiserror::Error,
};

#[derive(Debug, Error)]
pub enum Error {
    #[error("contract has no constructor but {0} arguments were given")]
    NoConstructor(usize),
    #[error("constructor takes {expected} arguments but {given} were given")]
    Arity { expected: usize, given: usize },
    #[error("invalid value {value:?} for constructor argument {name:?} of type {ty}")]
    InvalidArgument {
        name: String,
        ty: String,
        value: String,
        #[source]
        source: alloy::dyn_abi::Error,
    },
    #[error("could not encode constructor arguments")]
    Encoding(#[source] alloy::dyn_abi::Error),
}

/// Builds the code of a contract creation transaction: the artifact's
/// bytecode followed by the ABI encoded constructor arguments.
///
/// Arguments are given as strings and coerced into the types the constructor
/// declares (`"42"` for `uint256`, `"[1,2]"` for `uint8[]`, ...).
pub fn creation_code(artifact: &Artifact, args: &[String]) -> Result<Bytes, Error> {
    let encoded = match &artifact.abi.constructor {
        None if args.is_empty() => Vec::new(),
        None => return Err(Error::NoConstructor(args.len())),
        Some(constructor) => {
            if constructor.inputs.len() != args.len() {
                return Err(Error::Arity {
                    expected: constructor.inputs.len(),
                    given: args.len(),
                });
            }
            let values = constructor
                .inputs
                .iter()
                .zip(args)
                .map(|(param, value)| {
                    let invalid = |source| Error::InvalidArgument {
                        name: param.name.clone(),
                        ty: param.ty.clone(),
                        value: value.clone(),
                        source,
                    };
                    param
                        .resolve()
                        .and_then(|ty| ty.coerce_str(value))
                        .map_err(invalid)
                })
                .collect::<Result<Vec<DynSolValue>, _>>()?;
            constructor
                .abi_encode_input(&values)
                .map_err(Error::Encoding)?
        }
    };

    let mut code = artifact.bytecode.to_vec();
    code.extend(encoded);
    Ok(code.into())
}
