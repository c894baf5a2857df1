use super::OutboundMessage;
use marten_network::prelude::*;

macro_rules! define_messages {
    (
        $( $typename:ident => { ( $( $argname:ident : $argtype:ty ),* ) => $format:literal } ),* $(,)?
    ) => {
        $(
            #[derive(Debug, Clone)]
            pub struct $typename {
                $( $argname: String, )*
            }

            impl $typename {
                pub fn new( $( $argname: $argtype ),* ) -> Self {
                    Self {
                        $( $argname: $argname.to_string(), )*
                    }
                }
            }

            impl std::fmt::Display for $typename {
                fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                    $( let $argname = &self.$argname; )*
                    write!(f, $format)
                }
            }

            impl From<$typename> for OutboundMessage {
                fn from(msg: $typename) -> Self {
                    OutboundMessage::new(msg.to_string())
                }
            }
        )*
    };
}

define_messages! {
    Server  => { (source: &ServerName, name: &str, hopcount: u32, info: &str)
                                => ":{source} SERVER {name} {hopcount} :{info}" },
    Sid     => { (source: &str, name: &str, hopcount: u32, sid: &ServerId, info: &str)
                                => ":{source} SID {name} {hopcount} {sid} :{info}" },
    Ping    => { (source: &ServerId, origin: &ServerName, destination: &str)
                                => ":{source} PING {origin} {destination}" },
    Error   => { (text: &str)   => "ERROR :{text}" },
    Wallops => { (source: &ServerId, text: &str)
                                => ":{source} WALLOPS :{text}" },
}

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn renders_introduction_forms() {
        let source = ServerName::from_str("hub.example.net").unwrap();
        let sid = ServerId::from_str("1AB").unwrap();

        assert_eq!(
            Server::new(&source, "leaf.example.net", 2, "(H) Somewhere").to_string(),
            ":hub.example.net SERVER leaf.example.net 2 :(H) Somewhere"
        );
        assert_eq!(
            Sid::new("0AB", "leaf.example.net", 2, &sid, "Somewhere").to_string(),
            ":0AB SID leaf.example.net 2 1AB :Somewhere"
        );
    }

    #[test]
    fn renders_control_messages() {
        let name = ServerName::from_str("hub.example.net").unwrap();
        let sid = ServerId::from_str("0AB").unwrap();

        assert_eq!(
            Ping::new(&sid, &name, "1AB").to_string(),
            ":0AB PING hub.example.net 1AB"
        );
        assert_eq!(Error::new("Server juped.").to_string(), "ERROR :Server juped.");
        assert_eq!(
            Wallops::new(&sid, "SID reuse").to_string(),
            ":0AB WALLOPS :SID reuse"
        );
    }
}
